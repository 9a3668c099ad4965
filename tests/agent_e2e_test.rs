// ==========================================
// 请求分发端到端测试
// ==========================================
// 场景: 自由文本 → TaggedResult（xlsx 数据源 + 内存数据源）
// ==========================================


use bolt_agent::config::AppConfig;
use bolt_agent::{BoltAgent, CellValue, MemoryTableStore, Table, TableCatalog, TaggedResult};
use std::sync::Arc;
use test_helpers::*;

fn memory_agent(materials: Table, sales: Table) -> BoltAgent {
    let catalog = TableCatalog::new(
        Arc::new(MemoryTableStore::new("materials", materials)),
        Arc::new(MemoryTableStore::new("sales", sales)),
    );
    BoltAgent::new(Arc::new(catalog), &AppConfig::default()).unwrap()
}

#[test]
fn test_sales_request_without_rows() {
    let agent = memory_agent(catalog_table(), sales_table(&[]));
    let result = agent.process_request("vendas 12345");
    assert_eq!(result.status(), "no_sales");
    match result {
        TaggedResult::NoSales { message } => assert!(message.contains("12345")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_sales_opportunity_summary() {
    let agent = memory_agent(
        catalog_table(),
        sales_table(&[(12345, 10.0, 500.0, "ACME", "2024-01-10")]),
    );
    match agent.process_request("vendas 12345") {
        TaggedResult::SalesOpportunity {
            code,
            rows,
            summary_text,
        } => {
            assert_eq!(code, "12345");
            assert_eq!(rows.len(), 1);
            assert!(summary_text.contains("Total Peso: 10"));
            assert!(summary_text.contains("Total Valor: 500"));
            assert!(summary_text.contains("- Cliente: ACME, Peso: 10, Data: 2024-01-10"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_sales_opportunity_sums_rows() {
    let agent = memory_agent(
        catalog_table(),
        sales_table(&[
            (12345, 10.0, 500.0, "ACME", "2024-01-10"),
            (12345, 2.5, 100.0, "BETA", "2024-01-12"),
            (99999, 7.0, 70.0, "GAMA", "2024-01-13"),
        ]),
    );
    match agent.process_request("Oportunidade de venda para o material 12345") {
        TaggedResult::SalesOpportunity { summary_text, .. } => {
            assert!(summary_text.starts_with(
                "Histórico de vendas (Total Peso: 12.5 TN, Total Valor: 600):\n"
            ));
            assert_eq!(summary_text.lines().count(), 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_found_material_from_xlsx() {
    let (_dir, materials, sales) =
        create_workbooks(&catalog_table(), &sales_table(&[])).unwrap();
    let config = AppConfig {
        material_source: materials.display().to_string(),
        sales_source: sales.display().to_string(),
        ..AppConfig::default()
    };
    let agent = BoltAgent::from_config(&config).unwrap();

    let result = agent.process_request(
        "Setor: JIT, Qualidade: sae 1006, Laminação: LF, Espessura: 0,6mm, Largura: 1200",
    );
    match result {
        TaggedResult::FoundMaterial { code, criteria } => {
            assert_eq!(code, "12345");
            assert_eq!(criteria.sector.as_deref(), Some("JIT"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_alternatives_when_no_exact_match() {
    let agent = memory_agent(catalog_table(), sales_table(&[]));
    match agent.process_request("Espessura: 1.0, Largura: 999") {
        TaggedResult::Alternatives { rows, criteria } => {
            assert_eq!(rows.len(), 2);
            assert_eq!(criteria.thickness, Some(1.0));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_not_found() {
    let agent = memory_agent(catalog_table(), sales_table(&[]));
    let result = agent.process_request("Espessura: 8, Largura: 1200");
    assert_eq!(
        result,
        TaggedResult::NotFound {
            message: "Material não encontrado. Deseja criar um novo?".to_string()
        }
    );
}

#[test]
fn test_missing_mandatory_is_error() {
    let agent = memory_agent(catalog_table(), sales_table(&[]));
    let result = agent.process_request("Qualidade: SAE1006, Largura: 1200");
    assert!(result.is_error());
}

#[test]
fn test_missing_column_is_error() {
    let materials = TableBuilder::new(&["MATERIAL_CODE", "THICKNESS"])
        .row(vec![CellValue::Int(1), CellValue::Float(0.6)])
        .build();
    let agent = memory_agent(materials, sales_table(&[]));
    match agent.process_request("Espessura: 0.6, Largura: 1200") {
        TaggedResult::Error { message } => assert!(message.contains("WIDTH")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_result_json_shape() {
    let agent = memory_agent(catalog_table(), sales_table(&[]));
    let result = agent.process_request("vendas 12345");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "no_sales");
    assert!(json["message"].is_string());
}

#[test]
fn test_english_locale() {
    let catalog = TableCatalog::new(
        Arc::new(MemoryTableStore::new("materials", catalog_table())),
        Arc::new(MemoryTableStore::new("sales", sales_table(&[]))),
    );
    let config = AppConfig {
        locale: "en".to_string(),
        ..AppConfig::default()
    };
    let agent = BoltAgent::new(Arc::new(catalog), &config).unwrap();
    match agent.process_request("Espessura: 8, Largura: 1200") {
        TaggedResult::NotFound { message } => {
            assert_ne!(message, "Material não encontrado. Deseja criar um novo?")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_add_then_group_then_find() {
    let materials = Arc::new(MemoryTableStore::new("materials", catalog_table()));
    let catalog = TableCatalog::new(
        materials.clone(),
        Arc::new(MemoryTableStore::new("sales", sales_table(&[]))),
    );
    let agent = BoltAgent::new(Arc::new(catalog), &AppConfig::default()).unwrap();

    let mut fields = indexmap::IndexMap::new();
    fields.insert("Espessura".to_string(), "3".to_string());
    fields.insert("Largura".to_string(), "900".to_string());
    let code = agent.add_material(&fields).unwrap();
    assert_eq!(code, "12347");

    agent.assign_group(&code, "GROSSAS").unwrap();
    assert!(agent.assign_group("77777", "GROSSAS").is_err());

    let table = materials.snapshot().unwrap();
    assert_eq!(
        table.rows[2].get("GROUP"),
        Some(&CellValue::from("GROSSAS"))
    );

    match agent.process_request("Espessura: 3, Largura: 900") {
        TaggedResult::FoundMaterial { code, .. } => assert_eq!(code, "12347"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_sales_dates_from_named_sheet() {
    let (dir, materials, _) = create_workbooks(&catalog_table(), &sales_table(&[])).unwrap();
    let sales = dir.path().join("faturamento_erp.xlsx");
    write_dated_sales_xlsx(
        &sales,
        "Faturamento",
        &[
            (12345, 10.0, "ACME", (2024, 3, 1)),
            (12345, 2.0, "BETA", (2024, 12, 31)),
        ],
    )
    .unwrap();
    let config = AppConfig {
        material_source: materials.display().to_string(),
        sales_source: sales.display().to_string(),
        sales_sheet: Some("Faturamento".to_string()),
        ..AppConfig::default()
    };
    let agent = BoltAgent::from_config(&config).unwrap();

    match agent.process_request("vendas 12345") {
        TaggedResult::SalesOpportunity { summary_text, .. } => {
            assert!(summary_text.contains("- Cliente: ACME, Peso: 10, Data: 2024-03-01"));
            assert!(summary_text.contains("- Cliente: BETA, Peso: 2, Data: 2024-12-31"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_find_material_from_form_fields() {
    let agent = memory_agent(catalog_table(), sales_table(&[]));

    let mut fields = indexmap::IndexMap::new();
    fields.insert("Espessura".to_string(), "1,4".to_string());
    fields.insert("Largura".to_string(), "1000".to_string());
    fields.insert("Comprimento".to_string(), "3000mm".to_string());
    fields.insert("tipo_laminacao".to_string(), "lq".to_string());
    match agent.find_material(&fields) {
        TaggedResult::FoundMaterial { code, criteria } => {
            assert_eq!(code, "12346");
            assert_eq!(criteria.length, Some(3000.0));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let mut fields = indexmap::IndexMap::new();
    fields.insert("Espessura".to_string(), "8".to_string());
    assert_eq!(agent.find_material(&fields).status(), "not_found");

    let mut fields = indexmap::IndexMap::new();
    fields.insert("Largura".to_string(), "1000".to_string());
    assert!(agent.find_material(&fields).is_error());
}

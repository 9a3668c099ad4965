// ==========================================
// 材料目录智能助手 - 列名别名配置
// ==========================================
// 用途: 逻辑字段 → 表格中可接受的列名（按优先级）
// 规则: 第一个在表头中存在的别名生效
// ==========================================

use crate::domain::normalize_header;
use serde::{Deserialize, Serialize};

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn normalize_list(list: &mut Vec<String>) {
    *list = list
        .iter()
        .map(|n| normalize_header(n))
        .filter(|n| !n.is_empty())
        .collect();
}

// ==========================================
// 材料目录表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogColumns {
    pub material_code: Vec<String>,
    pub thickness: Vec<String>,
    pub width: Vec<String>,
    pub length: Vec<String>,
    pub lamination_type: Vec<String>,
    pub quality: Vec<String>,
    pub group: Vec<String>,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            material_code: aliases(&["MATERIAL_CODE", "MATERIAL", "CODIGO", "CÓDIGO"]),
            thickness: aliases(&["THICKNESS", "ESPESSURA"]),
            width: aliases(&["WIDTH", "LARGURA"]),
            length: aliases(&["LENGTH", "COMPRIMENTO"]),
            lamination_type: aliases(&["LAMINATION_TYPE", "LAMINAÇÃO", "LAMINACAO"]),
            quality: aliases(&["QUALITY", "QUALIDADE"]),
            group: aliases(&["GROUP", "GRUPO"]),
        }
    }
}

impl CatalogColumns {
    /// (逻辑名, 别名列表)；用于校验与表单字段映射
    pub fn logical_fields(&self) -> [(&'static str, &Vec<String>); 7] {
        [
            ("MATERIAL_CODE", &self.material_code),
            ("THICKNESS", &self.thickness),
            ("WIDTH", &self.width),
            ("LENGTH", &self.length),
            ("LAMINATION_TYPE", &self.lamination_type),
            ("QUALITY", &self.quality),
            ("GROUP", &self.group),
        ]
    }

    pub fn normalize(&mut self) {
        for list in [
            &mut self.material_code,
            &mut self.thickness,
            &mut self.width,
            &mut self.length,
            &mut self.lamination_type,
            &mut self.quality,
            &mut self.group,
        ] {
            normalize_list(list);
        }
    }
}

// ==========================================
// 销售历史表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesColumns {
    pub material_code: Vec<String>,
    pub weight: Vec<String>,
    pub net_value: Vec<String>,
    pub client_desc: Vec<String>,
    pub invoice_date: Vec<String>,
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self {
            material_code: aliases(&["MATERIAL_CODE", "MATERIAL"]),
            weight: aliases(&["WEIGHT", "PESO"]),
            net_value: aliases(&["NET_VALUE", "VALOR_LIQ"]),
            client_desc: aliases(&["CLIENT_DESC", "DESC_CLIENTE"]),
            invoice_date: aliases(&["INVOICE_DATE", "DATA_FAT"]),
        }
    }
}

impl SalesColumns {
    pub fn logical_fields(&self) -> [(&'static str, &Vec<String>); 5] {
        [
            ("MATERIAL_CODE", &self.material_code),
            ("WEIGHT", &self.weight),
            ("NET_VALUE", &self.net_value),
            ("CLIENT_DESC", &self.client_desc),
            ("INVOICE_DATE", &self.invoice_date),
        ]
    }

    pub fn normalize(&mut self) {
        for list in [
            &mut self.material_code,
            &mut self.weight,
            &mut self.net_value,
            &mut self.client_desc,
            &mut self.invoice_date,
        ] {
            normalize_list(list);
        }
    }
}

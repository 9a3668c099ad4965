// ==========================================
// 材料目录智能助手 - 命令行入口
// ==========================================
// 子命令:
// - ask: 处理单条请求，输出 JSON 结果
// - chat: 逐行读取标准输入，逐条输出 JSON 结果
// - find: 按表单字段（KEY=VALUE）查找材料，输出 JSON 结果
// - add: 新增材料（KEY=VALUE）
// - group: 将一个或多个编码归入分组
// ==========================================

use anyhow::{bail, Context};
use bolt_agent::config::AppConfig;
use bolt_agent::{i18n, logging, BoltAgent};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bolt-agent", version, about = "Materials catalog agent")]
struct Cli {
    /// JSON configuration file (defaults to BOLT_AGENT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a single free-text request
    Ask { text: Vec<String> },
    /// Read requests from stdin, one per line, until an empty line
    Chat,
    /// Look up a material from form fields
    Find {
        /// Criteria values, e.g. Espessura=0,6 Largura=1200 Qualidade=SAE1006
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Add a material to the catalog
    Add {
        /// Field values, e.g. Espessura=0,6 Largura=1200
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Assign material codes to a group
    Group {
        #[arg(long)]
        name: String,
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

fn parse_fields(pairs: &[String]) -> anyhow::Result<IndexMap<String, String>> {
    let mut fields = IndexMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("campo inválido '{}': use CHAVE=VALOR", pair);
        };
        fields.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(fields)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    tracing::info!("{} v{} 启动", bolt_agent::APP_NAME, bolt_agent::VERSION);

    let config = AppConfig::load(cli.config.as_deref()).context("falha ao carregar configuração")?;
    let agent = BoltAgent::from_config(&config)?;
    let locale = agent.locale().to_string();

    match cli.command {
        Command::Ask { text } => {
            let result = agent.process_request(&text.join(" "));
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Chat => {
            eprintln!("{}", i18n::t(&locale, "cli.prompt"));
            let stdin = io::stdin();
            let mut stdout = io::stdout().lock();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    break;
                }
                let result = agent.process_request(&line);
                writeln!(stdout, "{}", serde_json::to_string(&result)?)?;
                stdout.flush()?;
            }
        }
        Command::Find { fields } => {
            let result = agent.find_material(&parse_fields(&fields)?);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Add { fields } => {
            let fields = parse_fields(&fields)?;
            match agent.add_material(&fields) {
                Ok(code) => println!(
                    "{}",
                    i18n::t_with_args(&locale, "cli.material_added", &[("code", &code)])
                ),
                Err(e) => bail!(i18n::t_with_args(
                    &locale,
                    "agent.error",
                    &[("message", &e.to_string())]
                )),
            }
        }
        Command::Group { name, codes } => match agent.assign_group_many(&codes, &name) {
            Ok(count) => println!(
                "{}",
                i18n::t_with_args(
                    &locale,
                    "cli.group_assigned",
                    &[("group", name.trim()), ("count", &count.to_string())]
                )
            ),
            Err(e) => bail!(i18n::t_with_args(
                &locale,
                "agent.error",
                &[("message", &e.to_string())]
            )),
        },
    }

    Ok(())
}

// ==========================================
// 材料目录智能助手 - 远程 API 数据源
// ==========================================
// 协议: GET  <url> → Table JSON {columns, rows, revision?}
//       PUT  <url> ← Table JSON，带 If-Match: <revision>
//       412 Precondition Failed → 版本冲突
// ==========================================

use crate::domain::Table;
use crate::store::error::{StoreError, StoreResult};
use crate::store::table_store::TableStore;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::StatusCode;

pub struct HttpTableStore {
    client: Client,
    url: String,
}

impl HttpTableStore {
    pub fn new(url: &str) -> StoreResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(url, client))
    }

    /// 使用调用方配置好的客户端（超时、代理、认证头等）
    pub fn with_client(url: &str, client: Client) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// ETag 原值（含引号与 W/ 前缀）
fn etag(response: &reqwest::blocking::Response) -> Option<String> {
    response
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 实体标签原样发送；正文给出的裸版本号加引号
fn if_match_value(revision: &str) -> String {
    if revision.starts_with('"') || revision.starts_with("W/") {
        revision.to_string()
    } else {
        format!("\"{}\"", revision)
    }
}

impl TableStore for HttpTableStore {
    fn load(&self) -> StoreResult<Table> {
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        let header_revision = etag(&response);

        let mut table: Table = response.json()?;
        table.normalize_headers();
        if table.revision.is_none() {
            table.revision = header_revision;
        }

        tracing::debug!("远程表格读取: url={}, 行数={}", self.url, table.len());
        Ok(table)
    }

    fn replace(&self, table: &Table) -> StoreResult<()> {
        let mut request = self.client.put(&self.url).json(table);
        if let Some(revision) = &table.revision {
            request = request.header(IF_MATCH, if_match_value(revision));
        }

        let response = request.send()?;
        if response.status() == StatusCode::PRECONDITION_FAILED {
            return Err(StoreError::RevisionConflict {
                expected: table.revision.clone().unwrap_or_default(),
                actual: etag(&response).unwrap_or_else(|| "?".to_string()),
            });
        }
        response.error_for_status()?;

        tracing::info!("远程表格已回写: url={}, 行数={}", self.url, table.len());
        Ok(())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellValue;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// 本地桩服务: 按顺序应答，每个连接一个请求；返回收到的原始请求文本
    fn stub_server(responses: Vec<String>) -> (HttpTableStore, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/materials", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            responses
                .into_iter()
                .map(|response| {
                    let (mut stream, _) = listener.accept().unwrap();
                    let request = read_request(&mut stream);
                    stream.write_all(response.as_bytes()).unwrap();
                    request
                })
                .collect()
        });
        let client = Client::builder().no_proxy().build().unwrap();
        (HttpTableStore::with_client(&url, client), handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            head.push_str(&line);
        }
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();
        format!("{}\r\n{}", head, String::from_utf8_lossy(&body))
    }

    fn response(status: &str, etag: Option<&str>, body: &str) -> String {
        let etag = etag
            .map(|tag| format!("ETag: {}\r\n", tag))
            .unwrap_or_default();
        format!(
            "HTTP/1.1 {}\r\n{}Content-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            etag,
            body.len(),
            body
        )
    }

    fn header_line(request: &str, name: &str) -> Option<String> {
        request
            .lines()
            .find(|line| {
                line.split_once(':')
                    .map(|(n, _)| n.trim().eq_ignore_ascii_case(name))
                    .unwrap_or(false)
            })
            .and_then(|line| line.split_once(':'))
            .map(|(_, value)| value.trim().to_string())
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let store = HttpTableStore::new("http://localhost:8080/materials/").unwrap();
        assert_eq!(store.url(), "http://localhost:8080/materials");
        assert_eq!(store.describe(), "http://localhost:8080/materials");
    }

    #[test]
    fn test_unreachable_host_is_http_error() {
        // 端口 1 无服务，连接被拒绝
        let store = HttpTableStore::new("http://127.0.0.1:1/materials").unwrap();
        assert!(matches!(store.load(), Err(StoreError::HttpError(_))));
        assert!(matches!(
            store.replace(&Table::default()),
            Err(StoreError::HttpError(_))
        ));
    }

    #[test]
    fn test_load_then_replace_with_weak_etag() {
        let body = r#"{"columns": [" material_code ", "espessura"],
            "rows": [{" material_code ": "12345", "espessura": 0.6}]}"#;
        let (store, server) = stub_server(vec![
            response("200 OK", Some(r#"W/"rev-1""#), body),
            response("200 OK", None, "{}"),
        ]);

        let table = store.load().unwrap();
        assert_eq!(table.columns, vec!["MATERIAL_CODE", "ESPESSURA"]);
        assert_eq!(table.rows[0].get("MATERIAL_CODE"), Some(&CellValue::from("12345")));
        assert_eq!(table.rows[0].get("ESPESSURA"), Some(&CellValue::Float(0.6)));
        assert_eq!(table.revision.as_deref(), Some(r#"W/"rev-1""#));

        store.replace(&table).unwrap();

        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("GET /materials"));
        assert!(requests[1].starts_with("PUT /materials"));
        assert_eq!(
            header_line(&requests[1], "if-match").as_deref(),
            Some(r#"W/"rev-1""#)
        );
        assert!(requests[1].contains("\"MATERIAL_CODE\""));
    }

    #[test]
    fn test_body_revision_wins_and_is_quoted() {
        let body = r#"{"columns":["MATERIAL_CODE"],"rows":[],"revision":"7"}"#;
        let (store, server) = stub_server(vec![
            response("200 OK", Some(r#""etag-9""#), body),
            response("200 OK", None, "{}"),
        ]);

        let table = store.load().unwrap();
        assert_eq!(table.revision.as_deref(), Some("7"));
        store.replace(&table).unwrap();

        let requests = server.join().unwrap();
        assert_eq!(header_line(&requests[1], "if-match").as_deref(), Some(r#""7""#));
    }

    #[test]
    fn test_precondition_failed_is_revision_conflict() {
        let (store, server) = stub_server(vec![response(
            "412 Precondition Failed",
            Some(r#""rev-2""#),
            "{}",
        )]);

        let mut table = Table::new(vec!["MATERIAL_CODE".to_string()]);
        table.revision = Some(r#""rev-1""#.to_string());

        match store.replace(&table) {
            Err(StoreError::RevisionConflict { expected, actual }) => {
                assert_eq!(expected, r#""rev-1""#);
                assert_eq!(actual, r#""rev-2""#);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_server_error_is_http_error() {
        let (store, server) = stub_server(vec![response(
            "500 Internal Server Error",
            None,
            "{}",
        )]);
        assert!(matches!(store.load(), Err(StoreError::HttpError(_))));
        server.join().unwrap();
    }
}

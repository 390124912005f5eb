//! HTTP dispatch - builds and executes planned requests and captures
//! outcomes

use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};

use crate::messages::dispatch::{BodyPlan, DispatchOutcome, DispatchPlan, HeaderRule, MultipartField};
use crate::models::{HttpMethod, Response};

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn build_request(
    client: &reqwest::Client,
    plan: &DispatchPlan,
    rules: &[HeaderRule],
) -> reqwest::RequestBuilder {
    let mut builder = match plan.method {
        HttpMethod::GET => client.get(&plan.url),
        HttpMethod::POST => client.post(&plan.url),
        HttpMethod::PUT => client.put(&plan.url),
        HttpMethod::DELETE => client.delete(&plan.url),
        HttpMethod::PATCH => client.patch(&plan.url),
        HttpMethod::HEAD => client.head(&plan.url),
        HttpMethod::OPTIONS => client.request(reqwest::Method::OPTIONS, &plan.url),
    };

    for (key, value) in &plan.headers {
        builder = builder.header(key, value);
    }
    // registered override rules rewrite these at the transport layer,
    // last write wins over anything in the direct map
    for rule in rules {
        builder = builder.header(&rule.name, &rule.value);
    }

    match &plan.body {
        BodyPlan::Empty => {}
        BodyPlan::Raw(text) => builder = builder.body(text.clone()),
        BodyPlan::UrlEncoded(pairs) => builder = builder.form(pairs),
        BodyPlan::Multipart(fields) => {
            let mut form = Form::new();
            for field in fields {
                match field {
                    MultipartField::Text { name, value } => {
                        form = form.text(name.clone(), value.clone());
                    }
                    MultipartField::File {
                        name,
                        file_name,
                        content,
                    } => {
                        // reqwest computes the boundary and Content-Type
                        form = form.part(
                            name.clone(),
                            Part::bytes(content.clone()).file_name(file_name.clone()),
                        );
                    }
                }
            }
            builder = builder.multipart(form);
        }
    }

    builder
}

/// Execute a planned request. Elapsed time spans from dispatch to the full
/// body having been read; size is the decoded body's byte length.
pub async fn execute_plan(
    client: &reqwest::Client,
    plan: DispatchPlan,
    rules: Vec<HeaderRule>,
) -> DispatchOutcome {
    let start = Instant::now();
    let builder = build_request(client, &plan, &rules);

    let resp = match builder.send().await {
        Ok(resp) => resp,
        Err(e) => return DispatchOutcome::Failed(describe_error(&e)),
    };

    let status = resp.status().as_u16();
    let status_text = resp
        .status()
        .canonical_reason()
        .unwrap_or("")
        .to_string();
    let headers: Vec<(String, String)> = resp
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();

    let body = match resp.text().await {
        Ok(text) => text,
        Err(e) => return DispatchOutcome::Failed(format!("Error reading body: {}", e)),
    };
    let time_ms = start.elapsed().as_millis() as u64;
    let size = body.len() as u64;

    DispatchOutcome::Completed(Response {
        status,
        status_text,
        headers,
        body,
        time_ms,
        size,
    })
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        String::from("Request timed out (30s)")
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("Request failed: {}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(method: HttpMethod, url: &str) -> DispatchPlan {
        DispatchPlan {
            method,
            url: url.to_string(),
            headers: vec![],
            overrides: vec![],
            body: BodyPlan::Empty,
        }
    }

    #[test]
    fn test_override_rules_win_over_direct_headers() {
        let client = create_client();
        let mut p = plan(HttpMethod::GET, "https://x.com/a");
        p.headers = vec![("X-Tag".to_string(), "direct".to_string())];
        let rules = vec![HeaderRule {
            name: "X-Tag".to_string(),
            value: "rewritten".to_string(),
        }];
        let request = build_request(&client, &p, &rules).build().unwrap();
        assert_eq!(request.headers().get("X-Tag").unwrap(), "rewritten");
    }

    #[test]
    fn test_raw_body_is_attached() {
        let client = create_client();
        let mut p = plan(HttpMethod::POST, "https://x.com/a");
        p.body = BodyPlan::Raw("{\"a\":1}".to_string());
        let request = build_request(&client, &p, &[]).build().unwrap();
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, b"{\"a\":1}");
    }

    #[test]
    fn test_urlencoded_sets_content_type() {
        let client = create_client();
        let mut p = plan(HttpMethod::POST, "https://x.com/a");
        p.body = BodyPlan::UrlEncoded(vec![("a".to_string(), "1 2".to_string())]);
        let request = build_request(&client, &p, &[]).build().unwrap();
        assert_eq!(
            request.headers().get("content-type").unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[tokio::test]
    async fn test_connection_failure_yields_failed_outcome() {
        let client = create_client();
        // nothing listens on this port
        let outcome = execute_plan(&client, plan(HttpMethod::GET, "http://127.0.0.1:1/"), vec![]).await;
        match outcome {
            DispatchOutcome::Failed(message) => assert!(!message.is_empty()),
            DispatchOutcome::Completed(_) => panic!("expected failure"),
        }
    }
}

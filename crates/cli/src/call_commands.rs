use std::{io::Write, path::PathBuf};

use {
    anyhow::{Context, Result, bail},
    clap::{Args, ValueEnum},
    serde_json::{Value, json},
    webcall_config::PropertyLoader,
    webcall_http::{Body, MediaType, ProviderRegistry, WebComponent, WebRequest, WebResponse},
};

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Request body text.
    #[arg(long, conflicts_with = "body_file")]
    body: Option<String>,

    /// File sent as the request body.
    #[arg(long, value_name = "FILE")]
    body_file: Option<PathBuf>,

    /// Parse the body as JSON and send it through the request's JSON codec.
    #[arg(long)]
    json_body: bool,

    /// Media type of a raw body, e.g. `application/xml`.
    #[arg(long, value_name = "TYPE")]
    content_type: Option<String>,

    /// How to read the response body.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Bytes,
    Text,
    Json,
}

fn build_request(props: &PropertyLoader) -> WebRequest {
    WebRequest::from_properties(props, &ProviderRegistry::with_defaults())
}

pub fn show_request(props: &PropertyLoader) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&describe(&build_request(props)))?);
    Ok(())
}

fn describe(request: &WebRequest) -> Value {
    let headers: Vec<Value> = request
        .headers
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    json!({
        "logger": request.logger_name,
        "url": request.url,
        "method": request.method.map(|m| m.as_str()),
        "headers": headers,
        "connect_timeout_ms": request.connect_timeout().as_millis() as u64,
        "read_timeout_ms": request.read_timeout().as_millis() as u64,
        "response_charset": request.response_charset,
        "tls_provider": request.tls.is_some(),
    })
}

async fn body_from(args: &CallArgs) -> Result<Option<Body>> {
    let media_type = args
        .content_type
        .as_deref()
        .map(MediaType::new)
        .transpose()
        .context("invalid --content-type")?;

    if args.json_body {
        let text = match (&args.body, &args.body_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?,
            (None, None) => bail!("--json-body needs --body or --body-file"),
        };
        let value: Value = serde_json::from_str(&text).context("body is not valid JSON")?;
        return Ok(Some(Body::json(&value)?));
    }

    let body = match (&args.body, &args.body_file, media_type) {
        (Some(text), _, None) => Body::text(text.as_str()),
        (Some(text), _, Some(mt)) => Body::bytes(text.as_bytes()).with_media_type(mt),
        (None, Some(path), Some(mt)) => Body::file(path).with_media_type(mt),
        (None, Some(path), None) => Body::file(path),
        (None, None, _) => return Ok(None),
    };
    Ok(Some(body))
}

pub async fn call(props: &PropertyLoader, args: CallArgs) -> Result<()> {
    let component = WebComponent::new(build_request(props));
    let body = body_from(&args).await?;

    let status = match args.output {
        OutputFormat::Bytes => {
            let response = component.fetch_bytes(body).await?;
            report(&response);
            std::io::stdout().write_all(&response.data)?;
            response.status
        },
        OutputFormat::Text => {
            let response = component.fetch_text(body).await?;
            report(&response);
            println!("{}", response.data);
            response.status
        },
        OutputFormat::Json => {
            let response = component.fetch_json::<Value>(body).await?;
            report(&response);
            println!("{}", serde_json::to_string_pretty(&response.data)?);
            response.status
        },
    };

    if !(200..300).contains(&status) {
        bail!("call returned HTTP {status}");
    }
    Ok(())
}

fn report<T>(response: &WebResponse<T>) {
    eprintln!("HTTP {} ({} ms)", response.status, response.duration.as_millis());
}

#[cfg(test)]
mod tests {
    use {super::*, webcall_http::HttpMethod};

    fn args(body: Option<&str>, json_body: bool, content_type: Option<&str>) -> CallArgs {
        CallArgs {
            body: body.map(str::to_string),
            body_file: None,
            json_body,
            content_type: content_type.map(str::to_string),
            output: OutputFormat::Text,
        }
    }

    #[tokio::test]
    async fn body_selection() {
        assert!(body_from(&args(None, false, None)).await.unwrap().is_none());
        assert!(matches!(
            body_from(&args(Some("hi"), false, None)).await.unwrap(),
            Some(Body::Text { .. })
        ));
        assert!(matches!(
            body_from(&args(Some("<a/>"), false, Some("application/xml"))).await.unwrap(),
            Some(Body::Upload { media_type: Some(_), .. })
        ));
        assert!(matches!(
            body_from(&args(Some(r#"{"a":1}"#), true, None)).await.unwrap(),
            Some(Body::Json { .. })
        ));
    }

    #[tokio::test]
    async fn body_errors() {
        assert!(body_from(&args(Some("{oops"), true, None)).await.is_err());
        assert!(body_from(&args(None, true, None)).await.is_err());
        assert!(body_from(&args(Some("x"), false, Some("bogus"))).await.is_err());
    }

    #[tokio::test]
    async fn json_body_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, r#"{"id": 3}"#).unwrap();
        let call = CallArgs {
            body_file: Some(path),
            ..args(None, true, None)
        };
        let Some(Body::Json { value, .. }) = body_from(&call).await.unwrap() else {
            panic!("expected a JSON body");
        };
        assert_eq!(value, json!({"id": 3}));
    }

    #[test]
    fn request_description() {
        let request = WebRequest::new("https://example.com/x", HttpMethod::Delete)
            .with_header("Accept", "text/plain")
            .with_timeouts(-5, 900);
        let described = describe(&request);
        assert_eq!(described["method"], "DELETE");
        assert_eq!(described["url"], "https://example.com/x");
        assert_eq!(described["connect_timeout_ms"], 15_000);
        assert_eq!(described["read_timeout_ms"], 900);
        assert_eq!(described["headers"][0]["name"], "Accept");
        assert_eq!(described["tls_provider"], false);
    }
}

// src/github/client.rs
// =============================================================================
// A small client for the GitHub REST API.
//
// We only need three calls:
// - GET /repos/{owner}/{repo}                  repository metadata
// - GET /repos/{owner}/{repo}/contents/{dir}   directory listing
// - GET /repos/{owner}/{repo}/contents/{file}  file body (base64)
//
// Files too large to inline come back with encoding "none"; those are
// downloaded from their raw download_url instead.
//
// Rust concepts:
// - reqwest default headers: auth is set once on the client
// - serde: API responses deserialize straight into structs
// - Url: building request URLs without string concatenation bugs
// =============================================================================

use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::fetch::{ContentEntry, RepoContents};

const USER_AGENT: &str = concat!("csv-guardian/", env!("CARGO_PKG_VERSION"));

/// Repository metadata we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub html_url: String,
}

// Body of a single-file contents response
#[derive(Debug, Deserialize)]
struct FileContent {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

/// Authenticated access to one repository.
pub struct GitHubClient {
    http: Client,
    api: Url,
    owner: String,
    repo: String,
    git_ref: Option<String>,
}

impl GitHubClient {
    // Creates a client for one repository
    //
    // Parameters:
    //   api_url: API root, https://api.github.com or a GitHub Enterprise URL
    //   token: personal access token
    //   owner/repo: which repository to read
    //   git_ref: branch, tag or commit (None = default branch)
    pub fn new(
        api_url: &str,
        token: &str,
        owner: &str,
        repo: &str,
        git_ref: Option<String>,
    ) -> Result<Self> {
        let api = Url::parse(api_url).map_err(|e| anyhow!("Invalid API URL '{}': {}", api_url, e))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("GitHub token contains invalid characters")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api,
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref,
        })
    }

    /// Fetches repository metadata. Fails if the token can't see the repository.
    pub async fn repository(&self) -> Result<Repository> {
        let url = self.repo_url(&[])?;
        self.get_json(url).await
    }

    // Builds /repos/{owner}/{repo}/<extra...> under the API root
    fn repo_url(&self, extra: &[&str]) -> Result<Url> {
        let mut url = self.api.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("API URL cannot be a base: {}", self.api))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(extra);
        Ok(url)
    }

    // Builds the contents URL for a repository path
    //
    // "." and empty segments are dropped so "." and "" both mean the root.
    fn contents_url(&self, path: &str) -> Result<Url> {
        let mut segments = vec!["contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty() && *s != "."));

        let mut url = self.repo_url(&segments)?;
        if let Some(git_ref) = &self.git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        Ok(url)
    }

    // Sends a GET and turns any non-2xx status into an error naming the URL
    async fn send(&self, url: &str) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Failed to fetch {}: HTTP {}", url, status);
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.send(url.as_str())
            .await?
            .json()
            .await
            .with_context(|| format!("Unexpected response from {}", url))
    }

    // Downloads a raw file body
    async fn fetch_raw(&self, url: &str) -> Result<String> {
        let bytes = self
            .send(url)
            .await?
            .bytes()
            .await
            .with_context(|| format!("Could not read body of {}", url))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// Where a file's text comes from
#[derive(Debug, PartialEq, Eq)]
enum FileSource {
    /// Base64 content inlined in the API response
    Inline(String),
    /// Too large to inline; fetch this raw URL
    Download(String),
}

// Decides how to get a file's text from its contents response
//
// Inline base64 wins. Otherwise the response's download_url is used, then
// the one from the directory listing.
fn file_source(file: FileContent, entry: &ContentEntry) -> Result<FileSource> {
    match (file.encoding.as_deref(), file.content) {
        (Some("base64"), Some(content)) => Ok(FileSource::Inline(content)),
        _ => file
            .download_url
            .or_else(|| entry.download_url.clone())
            .map(FileSource::Download)
            .ok_or_else(|| anyhow!("No content or download URL for {}", entry.path)),
    }
}

impl RepoContents for GitHubClient {
    async fn list_dir(&self, path: &str) -> Result<Vec<ContentEntry>> {
        let url = self.contents_url(path)?;
        self.get_json(url).await
    }

    async fn read_file(&self, entry: &ContentEntry) -> Result<String> {
        let url = self.contents_url(&entry.path)?;
        let file: FileContent = self.get_json(url).await?;

        match file_source(file, entry)? {
            FileSource::Inline(content) => decode_content(&content)
                .with_context(|| format!("Could not decode {}", entry.path)),
            FileSource::Download(download_url) => self.fetch_raw(&download_url).await,
        }
    }
}

// Decodes GitHub's base64 content, which is wrapped every 60 characters
//
// Bytes that aren't UTF-8 (Latin-1 exports, mostly) become U+FFFD rather
// than failing the whole run.
fn decode_content(content: &str) -> Result<String> {
    let packed: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(packed)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fetch::EntryKind;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client(api: &str, git_ref: Option<&str>) -> GitHubClient {
        GitHubClient::new(
            api,
            "token",
            "ooi-integration",
            "ingestion-csvs",
            git_ref.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_repository_url() {
        let url = client("https://api.github.com", None).repo_url(&[]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/ooi-integration/ingestion-csvs");
    }

    #[test]
    fn test_contents_url_for_root() {
        let c = client("https://api.github.com", None);
        let expected = "https://api.github.com/repos/ooi-integration/ingestion-csvs/contents";
        assert_eq!(c.contents_url(".").unwrap().as_str(), expected);
        assert_eq!(c.contents_url("").unwrap().as_str(), expected);
    }

    #[test]
    fn test_contents_url_nested_with_ref() {
        let c = client("https://ghe.example.com/api/v3/", Some("release"));
        let url = c.contents_url("CE01ISSM/D00001.csv").unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/ooi-integration/ingestion-csvs/contents/CE01ISSM/D00001.csv?ref=release"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let result = GitHubClient::new("not a url", "t", "o", "r", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_wrapped_content() {
        let text = decode_content("aGVsbG8s\nd29ybGQ=\n").unwrap();
        assert_eq!(text, "hello,world");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_content("!!!").is_err());
    }

    #[test]
    fn test_decode_keeps_non_utf8_files() {
        // "caf\xe9" base64-encoded
        let text = decode_content("Y2Fm6Q==").unwrap();
        assert_eq!(text, "caf\u{FFFD}");
    }

    #[test]
    fn test_file_content_json() {
        let json = r#"{"type": "file", "encoding": "base64", "content": "YSxi\n", "path": "x.csv"}"#;
        let file: FileContent = serde_json::from_str(json).unwrap();
        assert_eq!(file.encoding.as_deref(), Some("base64"));
        assert_eq!(decode_content(&file.content.unwrap()).unwrap(), "a,b");
    }

    fn entry(path: &str, download_url: Option<&str>) -> ContentEntry {
        ContentEntry {
            kind: EntryKind::File,
            path: path.to_string(),
            download_url: download_url.map(str::to_string),
        }
    }

    fn content(encoding: Option<&str>, body: Option<&str>, download_url: Option<&str>) -> FileContent {
        FileContent {
            content: body.map(str::to_string),
            encoding: encoding.map(str::to_string),
            download_url: download_url.map(str::to_string),
        }
    }

    #[test]
    fn test_file_source_inline() {
        let file = content(Some("base64"), Some("YSxi"), Some("https://raw/x.csv"));
        assert_eq!(
            file_source(file, &entry("x.csv", None)).unwrap(),
            FileSource::Inline("YSxi".to_string())
        );
    }

    #[test]
    fn test_file_source_large_file_downloads() {
        let file = content(Some("none"), Some(""), Some("https://raw/big.csv"));
        assert_eq!(
            file_source(file, &entry("big.csv", None)).unwrap(),
            FileSource::Download("https://raw/big.csv".to_string())
        );
    }

    #[test]
    fn test_file_source_falls_back_to_listing_url() {
        let file = content(Some("none"), None, None);
        assert_eq!(
            file_source(file, &entry("big.csv", Some("https://raw/listed.csv"))).unwrap(),
            FileSource::Download("https://raw/listed.csv".to_string())
        );
    }

    #[test]
    fn test_file_source_nothing_to_read() {
        let file = content(Some("none"), None, None);
        let err = file_source(file, &entry("big.csv", None)).unwrap_err();
        assert!(err.to_string().contains("No content or download URL for big.csv"));
    }

    // Serves canned responses on a local port: request path -> (status, body)
    async fn serve(routes: HashMap<&'static str, (u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = routes.get(path).copied().unwrap_or((404, ""));
                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_error_status_is_fatal() {
        let base = serve(HashMap::new()).await;
        let c = client(&base, None);

        let err = c.repository().await.unwrap_err();
        assert!(err.to_string().contains("HTTP 404"));

        let err = c.fetch_raw(&format!("{}/raw/x.csv", base)).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn test_read_large_file_from_download_url() {
        let mut routes = HashMap::new();
        routes.insert(
            "/repos/ooi-integration/ingestion-csvs/contents/big.csv",
            (
                200,
                r#"{"encoding": "none", "content": "", "download_url": null}"#,
            ),
        );
        routes.insert("/raw/big.csv", (200, "filename_mask\nD00001/x.dat\n"));
        let base = serve(routes).await;

        let c = client(&base, None);
        let listed = entry("big.csv", Some(&format!("{}/raw/big.csv", base)));
        let text = c.read_file(&listed).await.unwrap();
        assert_eq!(text, "filename_mask\nD00001/x.dat\n");
    }

    #[tokio::test]
    async fn test_read_inline_file() {
        let mut routes = HashMap::new();
        routes.insert(
            "/repos/ooi-integration/ingestion-csvs/contents/ce01/a.csv",
            (200, r#"{"encoding": "base64", "content": "YSxi\n"}"#),
        );
        let base = serve(routes).await;

        let text = client(&base, None)
            .read_file(&entry("ce01/a.csv", None))
            .await
            .unwrap();
        assert_eq!(text, "a,b");
    }
}

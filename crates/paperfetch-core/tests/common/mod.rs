//! Shared fixtures: a mock Semantic Scholar API + landing page, and canned
//! search result pages.
#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use paperfetch_core::Config;

pub const S2_ID: &str = "d0d084fb94c54a9d7cb468cacb6f69d257d3ca49";
pub const ARXIV_ID: &str = "1805.09547";
pub const TITLE: &str =
    "Interpretable and Compositional Relation Learning by Joint Training with an Autoencoder";
pub const FIRST_AUTHOR: &str = "Ryo Takahashi";
pub const SEARCH_BASE: &str = "https://www.semanticscholar.org";

pub fn landing_path() -> String {
    format!("/paper/{}", S2_ID)
}

/// REST payload for the fixture paper; its landing page lives on `server`.
pub fn paper_json(server: &ServerGuard) -> String {
    format!(
        r#"{{
            "paperId": "{id}",
            "title": "{title}",
            "authors": [
                {{"authorId": "2111", "name": "Ryo Takahashi"}},
                {{"authorId": "2112", "name": "Ran Tian"}},
                {{"authorId": "2113", "name": "Kentaro Inui"}}
            ],
            "abstract": "Embedding models for entities and relations are extremely useful.",
            "year": 2018,
            "venue": "ACL",
            "url": "{base}{landing}",
            "arxivId": "{arxiv}",
            "citations": [],
            "references": []
        }}"#,
        id = S2_ID,
        title = TITLE,
        base = server.url(),
        landing = landing_path(),
        arxiv = ARXIV_ID,
    )
}

pub const LANDING_HTML: &str = r##"<html><body>
    <ul class="flex-row paper-detail-figures-list">
      <li><a href="#f1"><figure><div><img src="https://figures.semanticscholar.org/d0d0/2-Figure1-1.png"></div></figure></a></li>
      <li><a href="#f2"><figure><div><img src="https://figures.semanticscholar.org/d0d0/4-Figure2-1.png"></div></figure></a></li>
      <li><a href="#t1"><figure><div><img src="https://figures.semanticscholar.org/d0d0/6-Table1-1.png"></div></figure></a></li>
    </ul>
</body></html>"##;

pub fn mock_landing(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", landing_path().as_str())
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(LANDING_HTML)
        .create()
}

pub fn mock_paper(server: &mut ServerGuard, api_path: &str) -> Mock {
    let body = paper_json(server);
    server
        .mock("GET", api_path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

pub fn arxiv_path() -> String {
    format!("/v1/paper/arXiv:{}", ARXIV_ID)
}

pub fn s2_path() -> String {
    format!("/v1/paper/{}", S2_ID)
}

/// Config pointed at the mock server with all spacing disabled.
pub fn test_config(server: &ServerGuard) -> Config {
    Config {
        api_base_url: server.url(),
        search_base_url: SEARCH_BASE.to_string(),
        http_timeout_secs: 5,
        ..Config::default()
    }
    .without_delays()
}

fn row(title: &str, author: &str, href: &str) -> String {
    format!(
        r#"<div class="cl-paper-row serp-papers__paper-row">
            <a href="{href}"><h2 class="cl-paper-title">{title}</h2></a>
            <ul class="cl-paper-authors">
              <span data-heap-id="heap_author_list_item"><a href="/author/1">{author}</a></span>
            </ul>
        </div>"#
    )
}

fn results_page(rows: &[String]) -> String {
    format!(
        r#"<html><body><div class="result-page">{}</div></body></html>"#,
        rows.join("\n")
    )
}

fn target_row() -> String {
    row(
        TITLE,
        "R. Takahashi",
        &format!("/paper/Interpretable-and-Compositional-Relation-Takahashi-Tian/{}", S2_ID),
    )
}

/// Results where the fixture paper is ranked below two near misses.
pub fn exact_results_page() -> String {
    results_page(&[
        row(
            "Compositional Relation Learning with Autoencoders for Knowledge Bases",
            "Ryo Takahashi",
            "/paper/Compositional-Relation-Learning/1111111111111111111111111111111111111111",
        ),
        row(
            TITLE,
            "John Smith",
            "/paper/Interpretable-and-Compositional-Smith/2222222222222222222222222222222222222222",
        ),
        target_row(),
    ])
}

/// Results with the fixture paper ranked first.
pub fn best_results_page() -> String {
    results_page(&[
        target_row(),
        row(
            "Knowledge Graph Embedding via Relation Paths",
            "Jane Doe",
            "/paper/Knowledge-Graph-Embedding/3333333333333333333333333333333333333333",
        ),
    ])
}

/// A rendered results page with no rows.
pub fn empty_results_page() -> String {
    results_page(&[])
}

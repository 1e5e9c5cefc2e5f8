// src/render/page.rs
use super::escape_html;

pub const LOAD_FAILED: &str = "データの読み込みに失敗しました。";
pub const PUBLISH_HINT: &str = "スプレッドシートが「ウェブに公開」されているか確認してください。";

pub const LOADING_PLACEHOLDER: &str = "{{loading}}";
pub const PROJECTS_PLACEHOLDER: &str = "{{projects}}";

/// State of the loading indicator after one load cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Loading {
    Hidden,
    /// Load failed; holds the underlying error text (unescaped).
    Failed(String),
}

/// Result of one load cycle: the loading indicator and the projects container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub loading: Loading,
    /// Inner markup of the projects container.
    pub container: String,
}

impl Page {
    pub fn loaded(container: String) -> Self {
        Self {
            loading: Loading::Hidden,
            container,
        }
    }

    pub fn failed(error: &anyhow::Error) -> Self {
        Self {
            loading: Loading::Failed(format!("{:#}", error)),
            container: String::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.loading, Loading::Failed(_))
    }

    pub fn loading_markup(&self) -> String {
        match &self.loading {
            Loading::Hidden => "<div id=\"loading\" hidden></div>".to_string(),
            Loading::Failed(detail) => format!(
                "<div id=\"loading\"><p class=\"load-error\">{}</p>\
                 <p class=\"load-error-detail\">{}<br>エラー詳細: {}</p></div>",
                LOAD_FAILED,
                PUBLISH_HINT,
                escape_html(detail)
            ),
        }
    }

    pub fn container_markup(&self) -> String {
        format!("<div id=\"projects-container\">{}</div>", self.container)
    }

    /// Both containers without a surrounding document.
    pub fn to_fragment(&self) -> String {
        format!("{}\n{}\n", self.loading_markup(), self.container_markup())
    }

    /// A standalone HTML document.
    pub fn to_document(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_html(title),
            self.to_fragment()
        )
    }

    /// Substitute `{{loading}}` and `{{projects}}` in a user template.
    /// Single pass: placeholder text inside substituted markup stays literal.
    pub fn apply_template(&self, template: &str) -> String {
        let loading = self.loading_markup();
        let container = self.container_markup();
        let mut out = String::with_capacity(template.len() + loading.len() + container.len());
        let mut rest = template;
        loop {
            let next = [
                (LOADING_PLACEHOLDER, loading.as_str()),
                (PROJECTS_PLACEHOLDER, container.as_str()),
            ]
            .into_iter()
            .filter_map(|(placeholder, markup)| {
                rest.find(placeholder).map(|at| (at, placeholder, markup))
            })
            .min_by_key(|(at, _, _)| *at);
            match next {
                Some((at, placeholder, markup)) => {
                    out.push_str(&rest[..at]);
                    out.push_str(markup);
                    rest = &rest[at + placeholder.len()..];
                }
                None => {
                    out.push_str(rest);
                    return out;
                }
            }
        }
    }
}

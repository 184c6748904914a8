use anyhow::{anyhow, Result};
use tera::{Context, Tera};

use crate::config::UiConfig;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Default number of samples per classification window offered by the form
pub const DEFAULT_WINDOW_LENGTH: usize = 1000;

pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render_index(&self, config: &UiConfig) -> Result<String> {
        let mut context = Context::new();
        context.insert("backend_range_url", &config.ranges_url());
        context.insert("backend_process_url", &config.process_url());
        context.insert("default_window_length", &DEFAULT_WINDOW_LENGTH);

        self.tera
            .render("index.html", &context)
            .map_err(|e| anyhow!("Failed to render index page: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_embeds_backend_urls() {
        let page = PageRenderer::new()
            .unwrap()
            .render_index(&UiConfig::default())
            .unwrap();

        assert!(page.contains(r#"const RANGE_URL = "http://127.0.0.1:8000/ranges";"#));
        assert!(page.contains(r#"const PROCESS_URL = "http://127.0.0.1:8000/process";"#));
        assert!(page.contains(r#"name="window_length" min="1" value="1000""#));
    }
}

//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. Text values are escaped by Tera;
//! only rendered rich text is inserted with `safe`.

use serde::Serialize;
use tera::{Context, Tera};
use uuid::Uuid;

use crate::config::SiteConfig;
use crate::error::Result;
use crate::pages::{PostView, SummaryView};

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/summaries.html",
                include_str!("theme/partials/summaries.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    fn base_context(config: &SiteConfig) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(config));
        context
    }

    /// The post index with its load-more session
    pub fn render_index(
        &self,
        config: &SiteConfig,
        posts: &[SummaryView],
        session_id: Uuid,
        has_more: bool,
    ) -> Result<String> {
        let mut context = Self::base_context(config);
        context.insert("posts", posts);
        context.insert("session_id", &session_id.to_string());
        context.insert("has_more", &has_more);
        self.render("index.html", &context)
    }

    /// List items appended by a load-more request
    pub fn render_summaries(&self, config: &SiteConfig, posts: &[SummaryView]) -> Result<String> {
        let mut context = Self::base_context(config);
        context.insert("posts", posts);
        self.render("partials/summaries.html", &context)
    }

    pub fn render_post(&self, config: &SiteConfig, post: &PostView) -> Result<String> {
        let mut context = Self::base_context(config);
        context.insert("post", post);
        self.render("post.html", &context)
    }

    /// Shown while a slug cannot be resolved
    pub fn render_loading(&self, config: &SiteConfig) -> Result<String> {
        let context = Self::base_context(config);
        self.render("loading.html", &context)
    }
}

/// Site settings exposed to templates
#[derive(Debug, Clone, Serialize)]
struct ConfigData<'a> {
    title: &'a str,
    description: &'a str,
    locale: &'a str,
    labels: &'a crate::config::Labels,
}

impl<'a> From<&'a SiteConfig> for ConfigData<'a> {
    fn from(config: &'a SiteConfig) -> Self {
        Self {
            title: &config.title,
            description: &config.description,
            locale: &config.locale,
            labels: &config.labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RenderedBlock;

    fn summary(uid: &str, title: &str) -> SummaryView {
        SummaryView {
            uid: uid.to_string(),
            path: format!("/post/{}", uid),
            title: title.to_string(),
            subtitle: "Sub".to_string(),
            author: "Ana".to_string(),
            date: Some("15 mar 2021".to_string()),
        }
    }

    #[test]
    fn test_render_index() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let html = renderer
            .render_index(&config, &[summary("a", "<First>")], Uuid::nil(), true)
            .unwrap();
        assert!(html.contains(r#"href="/post/a""#));
        assert!(html.contains("&lt;First&gt;"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains(&Uuid::nil().to_string()));
    }

    #[test]
    fn test_render_index_without_more() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render_index(&SiteConfig::default(), &[summary("a", "A")], Uuid::nil(), false)
            .unwrap();
        assert!(!html.contains("more-posts\""));
        assert!(!html.contains("Carregar mais posts"));
    }

    #[test]
    fn test_render_post_inserts_markup() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = PostView {
            uid: "a".into(),
            title: "Title".into(),
            subtitle: String::new(),
            author: "Ana".into(),
            banner_url: None,
            date: "15 mar 2021".into(),
            reading_time: 3,
            blocks: vec![RenderedBlock {
                heading: "Intro".into(),
                anchor: "intro".into(),
                body_markup: "<p>Hello <strong>there</strong></p>".into(),
            }],
            previous: Some(summary("b", "Before")),
            next: None,
        };
        let html = renderer.render_post(&SiteConfig::default(), &post).unwrap();
        assert!(html.contains("<p>Hello <strong>there</strong></p>"));
        assert!(html.contains(r#"<h2 id="intro">Intro</h2>"#));
        assert!(html.contains("3 min"));
        assert!(html.contains("Post anterior"));
        assert!(!html.contains("Próximo post"));
    }

    #[test]
    fn test_render_loading() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_loading(&SiteConfig::default()).unwrap();
        assert!(html.contains("Carregando..."));
    }
}

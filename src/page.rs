use handlebars::Handlebars;
use serde_json::json;

use crate::aggregator::Release;
use crate::error::Result;

const TEMPLATE_NAME: &str = "index";

/// Renders the published HTML table of latest releases.
pub struct PageRenderer {
    template_engine: Handlebars<'static>,
    tracked_arch: String,
}

impl PageRenderer {
    pub fn new(tracked_arch: impl Into<String>) -> Result<Self> {
        let mut template_engine = Handlebars::new();
        template_engine.register_template_string(TEMPLATE_NAME, include_str!("../templates/index.html.hbs"))?;
        Ok(Self {
            template_engine,
            tracked_arch: tracked_arch.into(),
        })
    }

    pub fn render(&self, releases: &[Release]) -> Result<String> {
        let data = json!({
            "tracked_arch": self.tracked_arch,
            "releases": releases,
        });
        Ok(self.template_engine.render(TEMPLATE_NAME, &data)?)
    }
}

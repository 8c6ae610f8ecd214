//! Landing page assembly and rendering.
//!
//! Rendered once per route table build: the data (the version list) can
//! only change by producing a new table, so there is nothing to re-render
//! per request. A template failure is a build failure and keeps the
//! previous table serving.

use serde::Serialize;
use tera::Tera;

use crate::catalog::Version;

pub(crate) const INDEX_TEMPLATE: &str = include_str!("../../resources/web/index.html");

/// Everything the landing template needs.
#[derive(Debug, Clone, Serialize)]
pub struct LandingInfo {
    pub title: String,
    pub source_url: Option<String>,
    pub versions: Vec<VersionLink>,
}

/// One landing page entry per served version.
#[derive(Debug, Clone, Serialize)]
pub struct VersionLink {
    /// Full version name, as routed.
    pub name: String,
    /// Display qualifier: the part before the first `/`, if any.
    pub module: Option<String>,
    /// Display name with the module qualifier stripped.
    pub release: String,
    /// Absolute path to the version root.
    pub path: String,
}

impl LandingInfo {
    pub fn new(title: impl Into<String>, source_url: Option<String>, versions: &[Version]) -> Self {
        let versions = versions
            .iter()
            .map(|version| {
                let (module, release) = match version.name.split_once('/') {
                    Some((module, rest)) => (Some(module.to_string()), rest.to_string()),
                    None => (None, version.name.clone()),
                };
                VersionLink {
                    name: version.name.clone(),
                    module,
                    release,
                    path: format!("/versions/{}/", version.name),
                }
            })
            .collect();
        Self {
            title: title.into(),
            source_url,
            versions,
        }
    }
}

pub(crate) fn template_engine() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template("index", INDEX_TEMPLATE)?;
    Ok(tera)
}

pub(crate) fn render(tera: &Tera, info: &LandingInfo) -> Result<String, tera::Error> {
    let context = tera::Context::from_serialize(info)?;
    tera.render("index", &context)
}

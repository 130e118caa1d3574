//! Category template registry.
//!
//! Templates are keyed by category slug and kept in registration order.
//! Registering replaces the whole template for that slug; there is no merge.
//! Lookups hand out `Arc` snapshots, so a caller validating against a template
//! keeps a consistent view even if an administrator replaces it meanwhile.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use crate::config::SpecsConfig;
use crate::error::{Result, SpecsError};
use crate::normalize::normalize_fields;
use crate::types::{CategoryKey, CategoryTemplate};

/// How a lookup query was matched, in the order the rules are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupRule {
    /// Name equals the query, ignoring case.
    Name,
    /// Slug equals the query, ignoring case.
    Slug,
    /// Name contains the query, ignoring case.
    NameContains,
    /// Query contains the slug, ignoring case.
    ContainsSlug,
}

const LOOKUP_ORDER: [LookupRule; 4] = [
    LookupRule::Name,
    LookupRule::Slug,
    LookupRule::NameContains,
    LookupRule::ContainsSlug,
];

impl LookupRule {
    fn matches(self, template: &CategoryTemplate, lowered: &str) -> bool {
        let slug = template.slug().to_lowercase();
        match self {
            LookupRule::Name => template.name().to_lowercase() == lowered,
            LookupRule::Slug => slug == lowered,
            LookupRule::NameContains => template.name().to_lowercase().contains(lowered),
            LookupRule::ContainsSlug => !slug.is_empty() && lowered.contains(slug.as_str()),
        }
    }
}

/// On-disk seed file: `name`, optional `slug`, and `fields` in any payload shape.
#[derive(Debug, Deserialize)]
struct TemplateFile {
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    fields: Value,
}

/// Registry of category templates.
///
/// Constructed once and shared by reference; all methods take `&self`.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: RwLock<IndexMap<String, Arc<CategoryTemplate>>>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry and seed it from the configured templates directory.
    pub async fn from_config(config: &SpecsConfig) -> Result<Self> {
        let registry = Self::new();
        if let Some(dir) = &config.templates_dir {
            registry.load_dir(dir).await?;
        }
        Ok(registry)
    }

    /// Store a template, replacing any previous one for the same slug.
    pub fn register(&self, template: CategoryTemplate) -> Arc<CategoryTemplate> {
        let template = Arc::new(template);
        let slug = template.slug().to_string();
        let previous = self.write().insert(slug, Arc::clone(&template));
        debug!(
            slug = %template.slug(),
            fields = template.len(),
            replaced = previous.is_some(),
            "registered category template"
        );
        template
    }

    /// Find the template for a category name or slug.
    ///
    /// `None` means the category has no template and values are entered free-form.
    pub fn lookup(&self, category: &str) -> Option<Arc<CategoryTemplate>> {
        self.lookup_with_rule(category).map(|(template, _)| template)
    }

    /// Like [`lookup`](Self::lookup), also reporting which rule matched.
    pub fn lookup_with_rule(&self, category: &str) -> Option<(Arc<CategoryTemplate>, LookupRule)> {
        let query = category.trim();
        if query.is_empty() {
            return None;
        }
        let lowered = query.to_lowercase();
        let templates = self.read();

        let found = LOOKUP_ORDER.iter().find_map(|&rule| {
            templates
                .values()
                .find(|t| rule.matches(t, &lowered))
                .map(|t| (Arc::clone(t), rule))
        });

        match &found {
            Some((template, rule)) => {
                debug!(query, slug = %template.slug(), ?rule, "category template found")
            }
            None => debug!(query, "no category template"),
        }
        found
    }

    /// Template registered under exactly this slug.
    pub fn get(&self, slug: &str) -> Option<Arc<CategoryTemplate>> {
        self.read().get(slug).cloned()
    }

    /// Drop the template for a slug, returning it.
    pub fn remove(&self, slug: &str) -> Option<Arc<CategoryTemplate>> {
        self.write().shift_remove(slug)
    }

    /// All templates in registration order.
    pub fn templates(&self) -> Vec<Arc<CategoryTemplate>> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Seed templates from `*.yaml`, `*.yml` and `*.json` files, in file name order.
    ///
    /// Files that cannot be read or parsed are skipped. Returns the number of
    /// templates registered.
    pub async fn load_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        if !fs::try_exists(dir).await? {
            return Err(SpecsError::TemplatesDirNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml" | "json")
            ) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match read_template_file(&path).await {
                Ok(template) => {
                    self.register(template);
                    loaded += 1;
                }
                Err(e) => {
                    warn!(?path, %e, "skipping invalid category template file");
                }
            }
        }

        debug!(?dir, loaded, "loaded category templates");
        Ok(loaded)
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Arc<CategoryTemplate>>> {
        self.templates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Arc<CategoryTemplate>>> {
        self.templates.write().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn read_template_file(path: &Path) -> Result<CategoryTemplate> {
    let content = fs::read_to_string(path).await?;
    let file: TemplateFile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml_ng::from_str(&content)?,
    };

    let category = match file.slug {
        Some(slug) => CategoryKey::with_slug(file.name, slug),
        None => CategoryKey::new(file.name),
    };
    // Normalized fields are already key-unique
    CategoryTemplate::new(category, normalize_fields(&file.fields))
}

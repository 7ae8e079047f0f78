use crate::config::FilterConfig;
use crate::core::task::TaskRecord;

/// Announcement filter built from `[filters]`. Matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    task_types: Vec<String>,
    include_keywords: Vec<String>,
    exclude_keywords: Vec<String>,
}

fn lowered(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

impl TaskFilter {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            task_types: lowered(&config.task_types),
            include_keywords: lowered(&config.include_keywords),
            exclude_keywords: lowered(&config.exclude_keywords),
        }
    }

    pub fn allows(&self, task: &TaskRecord) -> bool {
        if !self.task_types.is_empty() {
            let Some(category) = task.category.as_deref() else {
                return false;
            };
            let category = category.to_lowercase();
            if !self.task_types.iter().any(|t| *t == category) {
                return false;
            }
        }

        let haystack = format!(
            "{} {}",
            task.title,
            task.description.as_deref().unwrap_or_default()
        )
        .to_lowercase();

        if !self.include_keywords.is_empty()
            && !self.include_keywords.iter().any(|k| haystack.contains(k))
        {
            return false;
        }

        !self.exclude_keywords.iter().any(|k| haystack.contains(k))
    }
}

use crate::core::task::TaskRecord;

/// Outcome of one HTTP probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub url: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiProbe {
    pub path: String,
    /// JSON shape of the body (`array`, `object`, ...), or `text`.
    pub body_kind: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub site: Option<Probe>,
    pub tasks_page: Option<Probe>,
    /// Match count per candidate selector, in configured order.
    pub coverage: Vec<(String, usize)>,
    pub sample: Option<TaskRecord>,
    pub api: Option<ApiProbe>,
}

impl CheckReport {
    /// Candidate selector with the most matches; ties go to the earlier one.
    pub fn best_selector(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (selector, count) in &self.coverage {
            if *count > best.map_or(0, |(_, top)| top) {
                best = Some((selector.as_str(), *count));
            }
        }
        best
    }

    fn tasks_page_ok(&self) -> bool {
        self.tasks_page.as_ref().is_some_and(|probe| probe.ok)
    }

    /// Number of failed checks.
    pub fn issues(&self) -> usize {
        let failed_probes = [&self.site, &self.tasks_page]
            .into_iter()
            .filter(|probe| probe.as_ref().is_none_or(|p| !p.ok))
            .count();
        let no_tasks = usize::from(self.tasks_page_ok() && self.best_selector().is_none());
        failed_probes + no_tasks
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            probe_line("Website", self.site.as_ref()),
            probe_line("Tasks page", self.tasks_page.as_ref()),
        ];

        if self.tasks_page_ok() {
            match self.best_selector() {
                Some((selector, count)) => lines.push(format!(
                    "✓ Found {count} potential task(s) using selector: {selector}"
                )),
                None => {
                    lines.push("✗ No tasks found with the configured selectors".to_string());
                    lines.push(
                        "› The page structure may need custom [extractor] selectors".to_string(),
                    );
                }
            }
            for (selector, count) in &self.coverage {
                lines.push(format!("    {selector:<24} {count}"));
            }
            if let Some(sample) = &self.sample {
                let description = sample.description.as_deref().unwrap_or("Not found");
                let preview: String = description.chars().take(50).collect();
                lines.push(format!("  Title: {}", sample.title));
                lines.push(format!("  Description: {preview}"));
                lines.push(format!("  Link: {}", sample.link));
            }
        }

        match &self.api {
            Some(api) => lines.push(format!(
                "✓ Found API endpoint: {} (response: {})",
                api.path, api.body_kind
            )),
            None => lines.push("› No API endpoints found (will use web scraping)".to_string()),
        }

        lines
    }
}

fn probe_line(label: &str, probe: Option<&Probe>) -> String {
    match probe {
        Some(probe) if probe.ok => format!("✓ {label} is accessible ({})", probe.url),
        Some(probe) => format!("✗ {label} failed ({}): {}", probe.url, probe.detail),
        None => format!("✗ {label} was not checked"),
    }
}

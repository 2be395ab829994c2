//! First-run setup wizard progress.

use crate::schema::Category;
use serde::{Deserialize, Serialize};

/// Each completed step owns one row, `setup_step_<step>`.
pub const SETUP_STEP_PREFIX: &str = "setup_step_";
pub const SETUP_COMPLETED_KEY: &str = "setup_completed";

/// Wizard step, each backed by one settings category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupStep {
    Database,
    General,
    Email,
    Storage,
}

impl SetupStep {
    /// Steps in the order the wizard presents them
    pub const ALL: [SetupStep; 4] = [Self::Database, Self::General, Self::Email, Self::Storage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::General => "general",
            Self::Email => "email",
            Self::Storage => "storage",
        }
    }

    /// Key of the row recording this step as done
    pub fn progress_key(&self) -> String {
        format!("{}{}", SETUP_STEP_PREFIX, self.as_str())
    }

    pub fn from_progress_key(key: &str) -> Option<Self> {
        let name = key.strip_prefix(SETUP_STEP_PREFIX)?;
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Database => Category::Database,
            Self::General => Category::General,
            Self::Email => Category::Email,
            Self::Storage => Category::Storage,
        }
    }
}

/// Completed steps, rebuilt from the per-step rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupProgress {
    pub completed_steps: Vec<SetupStep>,
}

impl SetupProgress {
    pub fn from_keys<'a, I: IntoIterator<Item = &'a str>>(keys: I) -> Self {
        let mut progress = Self::default();
        for step in keys.into_iter().filter_map(SetupStep::from_progress_key) {
            progress.mark(step);
        }
        progress
    }

    pub fn mark(&mut self, step: SetupStep) {
        if !self.completed_steps.contains(&step) {
            self.completed_steps.push(step);
        }
        self.completed_steps
            .sort_by_key(|s| SetupStep::ALL.iter().position(|o| o == s));
    }

    pub fn next_step(&self) -> Option<SetupStep> {
        SetupStep::ALL
            .into_iter()
            .find(|s| !self.completed_steps.contains(s))
    }

    pub fn is_complete(&self) -> bool {
        self.next_step().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub completed: bool,
    pub completed_steps: Vec<SetupStep>,
    pub next_step: Option<SetupStep>,
}

impl From<&SetupProgress> for SetupStatus {
    fn from(progress: &SetupProgress) -> Self {
        Self {
            completed: progress.is_complete(),
            completed_steps: progress.completed_steps.clone(),
            next_step: progress.next_step(),
        }
    }
}

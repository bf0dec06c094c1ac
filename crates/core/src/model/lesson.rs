use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assessment::Question;
use crate::model::ids::slugify;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("module {title:?} has no lessons")]
    NoLessons { title: String },

    #[error("question {id} in module {title:?} has no options")]
    NoOptions {
        title: String,
        id: crate::model::QuestionId,
    },

    #[error("question {id} in module {title:?} has no option at index {correct_index}")]
    InvalidCorrectOption {
        title: String,
        id: crate::model::QuestionId,
        correct_index: usize,
    },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// One titled unit of raw lesson text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub content: String,
}

impl Lesson {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Stable identity of a lesson: explicit id, else title slug, else `lesson-<index>`.
#[must_use]
pub fn lesson_id(lesson: &Lesson, index: usize) -> String {
    if let Some(id) = lesson.id.as_deref().filter(|id| !id.is_empty()) {
        return id.to_owned();
    }
    let slug = slugify(&lesson.title);
    if slug.is_empty() {
        format!("lesson-{index}")
    } else {
        slug
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// A named collection of lessons sharing one progression namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    title: String,
    lessons: Vec<Lesson>,
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct ModuleRecord {
    title: String,
    lessons: Vec<Lesson>,
    #[serde(default)]
    questions: Vec<Question>,
}

impl Module {
    /// # Errors
    ///
    /// Returns `ModuleError` if the title is blank, there are no lessons, a
    /// question has no options, or its correct index points past them.
    pub fn new(
        title: impl Into<String>,
        lessons: Vec<Lesson>,
        questions: Vec<Question>,
    ) -> Result<Self, ModuleError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModuleError::EmptyTitle);
        }
        if lessons.is_empty() {
            return Err(ModuleError::NoLessons { title });
        }
        if let Some(q) = questions.iter().find(|q| q.options.is_empty()) {
            return Err(ModuleError::NoOptions { title, id: q.id });
        }
        if let Some(q) = questions
            .iter()
            .find(|q| q.correct_index >= q.options.len())
        {
            return Err(ModuleError::InvalidCorrectOption {
                title,
                id: q.id,
                correct_index: q.correct_index,
            });
        }
        Ok(Self {
            title,
            lessons,
            questions,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    /// Always at least 1.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn lesson_ids(&self) -> Vec<String> {
        self.lessons
            .iter()
            .enumerate()
            .map(|(i, lesson)| lesson_id(lesson, i))
            .collect()
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Externally supplied content: module title → ordered lessons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    modules: Vec<Module>,
}

#[derive(Deserialize)]
struct CatalogRecord {
    modules: Vec<ModuleRecord>,
}

impl Catalog {
    #[must_use]
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    /// Parse a JSON catalog of the form `{"modules": [{"title", "lessons", "questions"}]}`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed or a module fails validation.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let record: CatalogRecord = serde_json::from_str(raw)?;
        let modules = record
            .modules
            .into_iter()
            .map(|m| Module::new(m.title, m.lessons, m.questions))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { modules })
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, title: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.title == title)
    }
}

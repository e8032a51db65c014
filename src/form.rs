//! Form state and the render cycle.
//!
//! A render cycle reads the form, assembles the document, appends a session
//! log row when auto-save is on, and reads back the recent history. Failures
//! of the log never prevent the document from being produced.

use std::path::{Path, PathBuf};

use crate::config::{Config, DEFAULT_TEMPLATES_FILE, FormDefaults};
use crate::history::{self, SessionLog, SessionLogRow};
use crate::prompt::{Answers, Mode, TargetAi, build_prompt};
use crate::template::{Template, TemplateStore};

/// Number of clarifying-answer inputs offered in DETAIL mode.
pub const ANSWER_SLOTS: usize = 3;

/// Hint shown above the answer inputs when no template is selected.
pub const DEFAULT_QUESTIONS: &str =
    "Who is the audience? What outcome? Any constraints (length, tone, format)?";

/// Current user inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub target_ai: TargetAi,
    pub mode: Mode,
    pub rough_idea: String,
    /// Raw answer inputs; blanks are filtered by [`FormState::answers`]
    pub answer_inputs: [String; ANSWER_SLOTS],
    pub max_length: String,
    pub extra_instructions: String,
    pub auto_save: bool,
    /// Clarifying questions suggested for the current template
    pub suggested_questions: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(&FormDefaults::default())
    }
}

impl FormState {
    /// Empty form starting from the configured defaults.
    pub fn new(defaults: &FormDefaults) -> Self {
        Self {
            target_ai: defaults.target_ai,
            mode: defaults.mode,
            rough_idea: String::new(),
            answer_inputs: Default::default(),
            max_length: String::new(),
            extra_instructions: String::new(),
            auto_save: defaults.auto_save,
            suggested_questions: DEFAULT_QUESTIONS.to_string(),
        }
    }

    /// Seed the form from a starter template.
    pub fn apply_template(&mut self, template: &Template) {
        self.rough_idea = template.rough_idea.clone();
        self.suggested_questions = if template.suggested_questions.trim().is_empty() {
            DEFAULT_QUESTIONS.to_string()
        } else {
            template.suggested_questions.clone()
        };
    }

    /// Return to the untemplated hint; typed text is kept.
    pub fn clear_template(&mut self) {
        self.suggested_questions = DEFAULT_QUESTIONS.to_string();
    }

    /// Non-blank answers; always empty in BASIC mode.
    pub fn answers(&self) -> Answers {
        match self.mode {
            Mode::Detail => Answers::from_inputs(&self.answer_inputs),
            Mode::Basic => Answers::default(),
        }
    }

    /// The assembled document for the current inputs.
    pub fn optimized_prompt(&self) -> String {
        build_prompt(
            &self.rough_idea,
            self.target_ai,
            self.mode,
            &self.answers(),
            &self.max_length,
            &self.extra_instructions,
        )
    }

    /// The session log row recording `optimized` for the current inputs.
    pub fn log_row(&self, optimized: &str) -> SessionLogRow {
        SessionLogRow::now(
            self.target_ai,
            self.mode,
            &self.rough_idea,
            &self.answers(),
            &self.max_length,
            &self.extra_instructions,
            optimized,
        )
    }
}

/// Outcome of one render cycle.
#[derive(Debug)]
pub struct Render {
    /// The assembled document; empty when there is no rough idea yet
    pub optimized: String,

    /// Result of the auto-save append, if one was attempted
    pub saved: Option<Result<(), history::Error>>,

    /// Most recent session log rows, or why they could not be read
    pub history: Result<Vec<SessionLogRow>, history::Error>,
}

/// Process-owned resources backing the form.
#[derive(Debug)]
pub struct Session {
    templates: TemplateStore,
    templates_path: PathBuf,
    /// Why the template file could not be loaded, if it could not
    templates_error: Option<String>,
    log: SessionLog,
    export_dir: PathBuf,
    history_rows: usize,
}

impl Session {
    /// Session over already opened resources, with the default template path.
    pub fn new(
        templates: TemplateStore,
        log: SessionLog,
        export_dir: PathBuf,
        history_rows: usize,
    ) -> Self {
        Self {
            templates,
            templates_path: PathBuf::from(DEFAULT_TEMPLATES_FILE),
            templates_error: None,
            log,
            export_dir,
            history_rows,
        }
    }

    /// Record the template file the store came from, and why loading it
    /// failed if it did.
    pub fn with_templates_origin(
        mut self,
        path: impl Into<PathBuf>,
        error: Option<String>,
    ) -> Self {
        self.templates_path = path.into();
        self.templates_error = error;
        self
    }

    /// Open the session described by `config`.
    ///
    /// A template file that cannot be parsed is logged and replaced by an
    /// empty store so the form stays usable.
    pub fn open(config: &Config) -> Self {
        let (templates, error) = match TemplateStore::load(&config.templates) {
            Ok(templates) => (templates, None),
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::from(e));
                tracing::warn!(error = %message, "ignoring template file");
                (TemplateStore::default(), Some(message))
            }
        };
        Self::new(
            templates,
            SessionLog::new(&config.history),
            config.export_dir.clone(),
            config.history_rows,
        )
        .with_templates_origin(&config.templates, error)
    }

    /// Starter templates, empty when the file was missing or ignored.
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Template file the session was opened with.
    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Why the template file was ignored, if it was.
    pub fn templates_error(&self) -> Option<&str> {
        self.templates_error.as_deref()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Directory export files are written to.
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Number of session log rows shown.
    pub fn history_rows(&self) -> usize {
        self.history_rows
    }

    /// Run one render cycle for `form`.
    pub fn render(&self, form: &FormState) -> Render {
        let optimized = form.optimized_prompt();

        let saved = (form.auto_save && !optimized.is_empty()).then(|| {
            let result = self.log.append(&form.log_row(&optimized));
            if let Err(e) = &result {
                tracing::warn!(error = %e, "session log append failed");
            }
            result
        });

        let history = self.history();

        tracing::debug!(
            chars = optimized.chars().count(),
            saved = matches!(saved, Some(Ok(()))),
            "rendered form"
        );
        Render {
            optimized,
            saved,
            history,
        }
    }

    /// The most recent session log rows.
    pub fn history(&self) -> Result<Vec<SessionLogRow>, history::Error> {
        self.log.tail(self.history_rows).inspect_err(|e| {
            tracing::warn!(error = %e, "session log unreadable");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(dir: &Path) -> Session {
        Session::new(
            TemplateStore::default(),
            SessionLog::new(dir.join("history.csv")),
            dir.to_path_buf(),
            20,
        )
    }

    fn sales_form() -> FormState {
        FormState {
            rough_idea: "Write me a sales email".to_string(),
            ..FormState::default()
        }
    }

    #[test]
    fn defaults_match_initial_form() {
        let form = FormState::default();
        assert_eq!(form.target_ai, TargetAi::ChatGpt);
        assert_eq!(form.mode, Mode::Detail);
        assert!(form.auto_save);
        assert_eq!(form.suggested_questions, DEFAULT_QUESTIONS);
        assert_eq!(form.optimized_prompt(), "");
    }

    #[test]
    fn basic_mode_discards_answers() {
        let mut form = sales_form();
        form.answer_inputs[0] = "Small business owners".to_string();
        assert_eq!(form.answers().len(), 1);

        form.mode = Mode::Basic;
        assert!(form.answers().is_empty());
        assert_eq!(form.log_row("doc").answers, "{}");
    }

    #[test]
    fn template_seeds_rough_idea_and_questions() {
        let template = Template {
            id: 7,
            category: "Marketing".to_string(),
            rough_idea: "Draft a launch tweet".to_string(),
            tags: String::new(),
            suggested_questions: "Which product? Which audience?".to_string(),
        };
        let mut form = FormState::default();
        form.apply_template(&template);
        assert_eq!(form.rough_idea, "Draft a launch tweet");
        assert_eq!(form.suggested_questions, "Which product? Which audience?");

        form.clear_template();
        assert_eq!(form.suggested_questions, DEFAULT_QUESTIONS);
        assert_eq!(form.rough_idea, "Draft a launch tweet");
    }

    #[test]
    fn render_without_rough_idea_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());

        let render = session.render(&FormState::default());
        assert_eq!(render.optimized, "");
        assert!(render.saved.is_none());
        assert!(render.history.unwrap().is_empty());
        assert!(!session.log().path().exists());
    }

    #[test]
    fn render_appends_when_auto_save_on() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let form = sales_form();

        let first = session.render(&form);
        assert!(matches!(first.saved, Some(Ok(()))));
        let second = session.render(&form);

        let rows = second.history.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].rough_idea, "Write me a sales email");
        assert_eq!(rows[1].optimized_length, second.optimized.chars().count());
    }

    #[test]
    fn render_skips_log_when_auto_save_off() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let form = FormState {
            auto_save: false,
            ..sales_form()
        };

        let render = session.render(&form);
        assert!(!render.optimized.is_empty());
        assert!(render.saved.is_none());
        assert!(!session.log().path().exists());
    }

    #[test]
    fn malformed_log_does_not_block_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("history.csv"), "timestamp,mode\n\"unterminated")
            .unwrap();
        let session = session(dir.path());

        let render = session.render(&sales_form());
        assert!(render.optimized.contains("=== INPUT ===\nWrite me a sales email"));
        assert!(matches!(render.saved, Some(Err(_))));
        assert!(render.history.is_err());
    }

    #[test]
    fn non_ascii_document_length_counts_characters() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let form = FormState {
            rough_idea: "Écris un e-mail de vente ✉".to_string(),
            ..sales_form()
        };

        let render = session.render(&form);
        let row = render.history.unwrap().remove(0);
        assert_eq!(row.optimized_length, render.optimized.chars().count());
        assert!(row.optimized_length < render.optimized.len());
    }

    #[test]
    fn open_remembers_template_origin() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            templates: dir.path().join("starter.csv"),
            history: dir.path().join("history.csv"),
            export_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let session = Session::open(&config);
        assert_eq!(session.templates_path(), dir.path().join("starter.csv"));
        assert!(session.templates_error().is_none());

        std::fs::write(
            &config.templates,
            "ID,Category,Rough Idea,Tags,Suggested Clarifying Questions\nabc,X,Y,,\n",
        )
        .unwrap();
        let session = Session::open(&config);
        assert!(session.templates().is_empty());
        let error = session.templates_error().unwrap();
        assert!(error.starts_with("malformed template file"), "{error}");
        assert!(error.contains("at row 1: "), "{error}");
    }
}

//! Interactive form state.
//!
//! The preview is re-assembled on every edit since assembly is pure. Only an
//! explicit commit runs the render cycle that writes to the session log.

use crate::config::FormDefaults;
use crate::export;
use crate::form::{ANSWER_SLOTS, FormState, Session};
use crate::history::SessionLogRow;
use crate::prompt::{Mode, TargetAi};
use crate::template::{CategoryFilter, Template};
use crate::ui::input::Action;

/// A focusable form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TargetAi,
    Mode,
    Category,
    Template,
    AutoSave,
    RoughIdea,
    Answer(usize),
    MaxLength,
    Extras,
}

impl Field {
    fn is_text(self) -> bool {
        matches!(
            self,
            Field::RoughIdea | Field::Answer(_) | Field::MaxLength | Field::Extras
        )
    }

    fn is_multiline(self) -> bool {
        matches!(self, Field::RoughIdea | Field::Extras)
    }
}

/// Message shown in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

impl Status {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

pub struct App {
    pub form: FormState,
    pub focus: Field,
    /// Category filter choices; empty when there are no templates
    pub categories: Vec<CategoryFilter>,
    pub category: usize,
    /// Picker position: 0 is "(none)", `n` is the n-th template under the filter
    pub template: usize,
    /// The document for the current inputs
    pub preview: String,
    /// Recent session log rows, or why they are unavailable
    pub history: Result<Vec<SessionLogRow>, String>,
    pub status: Option<Status>,
    pub should_quit: bool,
}

impl App {
    /// Fresh form with the configured defaults and the current history.
    pub fn new(session: &Session, defaults: &FormDefaults) -> Self {
        let form = FormState::new(defaults);
        let preview = form.optimized_prompt();
        Self {
            form,
            focus: Field::RoughIdea,
            categories: session.templates().category_choices(),
            category: 0,
            template: 0,
            preview,
            history: session.history().map_err(error_message),
            status: None,
            should_quit: false,
        }
    }

    /// Fields in focus order; answers only exist in DETAIL mode.
    pub fn visible_fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::TargetAi, Field::Mode];
        if !self.categories.is_empty() {
            fields.extend([Field::Category, Field::Template]);
        }
        fields.extend([Field::AutoSave, Field::RoughIdea]);
        if self.form.mode == Mode::Detail {
            fields.extend((0..ANSWER_SLOTS).map(Field::Answer));
        }
        fields.extend([Field::MaxLength, Field::Extras]);
        fields
    }

    /// The selected category choice, `All` when there are none.
    pub fn category_filter(&self) -> CategoryFilter {
        self.categories
            .get(self.category)
            .cloned()
            .unwrap_or(CategoryFilter::All)
    }

    /// Templates offered by the picker under the current category.
    pub fn template_choices<'s>(&self, session: &'s Session) -> Vec<&'s Template> {
        session.templates().filter_by_category(&self.category_filter())
    }

    /// Template under the picker, if one is selected.
    pub fn selected_template<'s>(&self, session: &'s Session) -> Option<&'s Template> {
        let index = self.template.checked_sub(1)?;
        self.template_choices(session).get(index).copied()
    }

    /// Apply one key action and re-assemble the preview.
    pub fn apply(&mut self, action: Action, session: &Session) {
        if !matches!(action, Action::None | Action::Commit | Action::Export(_)) {
            self.status = None;
        }
        match action {
            Action::None => return,
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::NextField => self.move_focus(1),
            Action::PrevField => self.move_focus(-1),
            Action::Left => self.cycle(-1, session),
            Action::Right => self.cycle(1, session),
            Action::Insert(' ') if self.focus == Field::AutoSave => {
                self.form.auto_save = !self.form.auto_save;
            }
            Action::Insert(c) => {
                if let Some(text) = self.focused_text() {
                    text.push(c);
                }
            }
            Action::Newline => {
                if self.focus.is_multiline() {
                    if let Some(text) = self.focused_text() {
                        text.push('\n');
                    }
                } else {
                    self.move_focus(1);
                }
            }
            Action::Backspace => {
                if let Some(text) = self.focused_text() {
                    text.pop();
                }
            }
            Action::ClearField => {
                if let Some(text) = self.focused_text() {
                    text.clear();
                }
            }
            Action::Commit => self.commit(session),
            Action::Export(format) => self.export(format, session),
        }
        self.preview = self.form.optimized_prompt();
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        if !self.focus.is_text() {
            return None;
        }
        match self.focus {
            Field::RoughIdea => Some(&mut self.form.rough_idea),
            Field::Answer(i) => self.form.answer_inputs.get_mut(i),
            Field::MaxLength => Some(&mut self.form.max_length),
            Field::Extras => Some(&mut self.form.extra_instructions),
            _ => None,
        }
    }

    fn move_focus(&mut self, step: isize) {
        let fields = self.visible_fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[wrap(current, step, fields.len())];
    }

    fn cycle(&mut self, step: isize, session: &Session) {
        match self.focus {
            Field::TargetAi => {
                self.form.target_ai = cycle_value(&TargetAi::ALL, self.form.target_ai, step);
            }
            Field::Mode => {
                self.form.mode = cycle_value(&Mode::ALL, self.form.mode, step);
            }
            Field::Category if !self.categories.is_empty() => {
                self.category = wrap(self.category, step, self.categories.len());
                self.template = 0;
                self.form.clear_template();
            }
            Field::Template => {
                let choices = self.template_choices(session).len() + 1;
                self.template = wrap(self.template, step, choices);
                match self.selected_template(session) {
                    Some(template) => {
                        tracing::debug!(id = template.id, "template selected");
                        self.form.apply_template(template);
                    }
                    None => self.form.clear_template(),
                }
            }
            Field::AutoSave => self.form.auto_save = !self.form.auto_save,
            _ => {}
        }
    }

    /// Run a render cycle and show its outcome.
    fn commit(&mut self, session: &Session) {
        let render = session.render(&self.form);
        let status = if render.optimized.is_empty() {
            Status::info("Start by typing a rough prompt")
        } else {
            match render.saved {
                Some(Ok(())) => Status::info("Prompt generated and saved to history"),
                Some(Err(e)) => Status::error(format!(
                    "Prompt generated; history not saved: {}",
                    error_message(e)
                )),
                None => Status::info("Prompt generated (auto-save off)"),
            }
        };
        self.status = Some(status);
        self.history = render.history.map_err(error_message);
    }

    fn export(&mut self, format: export::ExportFormat, session: &Session) {
        self.status = Some(
            match export::export(session.export_dir(), format, &self.preview) {
                Ok(path) => Status::info(format!("Saved {}", path.display())),
                Err(e) => Status::error(error_message(e)),
            },
        );
    }
}

fn wrap(index: usize, step: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + step).rem_euclid(len as isize) as usize
}

fn cycle_value<T: Copy + PartialEq>(all: &[T], current: T, step: isize) -> T {
    let index = all.iter().position(|v| *v == current).unwrap_or(0);
    all[wrap(index, step, all.len())]
}

/// An error and its sources on one line, `outer: inner: ...`.
fn error_message(error: impl Into<anyhow::Error>) -> String {
    format!("{:#}", error.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SessionLog;
    use crate::template::TemplateStore;

    fn template(id: i64, category: &str, rough: &str) -> Template {
        Template {
            id,
            category: category.to_string(),
            rough_idea: rough.to_string(),
            tags: String::new(),
            suggested_questions: format!("Questions for {id}?"),
        }
    }

    fn session(dir: &std::path::Path) -> Session {
        let store = TemplateStore::from_templates(vec![
            template(1, "Marketing", "Write me a sales email"),
            template(2, "Coding", "Explain this regex"),
        ]);
        let log = SessionLog::new(dir.join("history.csv"));
        Session::new(store, log, dir.to_path_buf(), 20)
    }

    fn type_text(app: &mut App, session: &Session, text: &str) {
        for c in text.chars() {
            app.apply(Action::Insert(c), session);
        }
    }

    #[test]
    fn typing_updates_preview() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let mut app = App::new(&session, &FormDefaults::default());
        assert_eq!(app.preview, "");

        type_text(&mut app, &session, "Write me a haiku");
        assert!(app.preview.contains("=== INPUT ===\nWrite me a haiku"));

        app.apply(Action::ClearField, &session);
        assert_eq!(app.preview, "");
    }

    #[test]
    fn answer_fields_hidden_in_basic_mode() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let mut app = App::new(&session, &FormDefaults::default());
        assert!(app.visible_fields().contains(&Field::Answer(2)));

        app.focus = Field::Mode;
        app.apply(Action::Right, &session);
        assert_eq!(app.form.mode, Mode::Basic);
        assert!(!app.visible_fields().iter().any(|f| matches!(f, Field::Answer(_))));
    }

    #[test]
    fn focus_wraps_around() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let mut app = App::new(&session, &FormDefaults::default());
        app.focus = Field::Extras;
        app.apply(Action::NextField, &session);
        assert_eq!(app.focus, Field::TargetAi);
        app.apply(Action::PrevField, &session);
        assert_eq!(app.focus, Field::Extras);
    }

    #[test]
    fn template_picker_respects_category() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let mut app = App::new(&session, &FormDefaults::default());
        assert_eq!(app.categories.len(), 3);

        // All -> Coding
        app.focus = Field::Category;
        app.apply(Action::Right, &session);
        assert_eq!(app.category_filter(), CategoryFilter::Named("Coding".into()));

        app.focus = Field::Template;
        app.apply(Action::Right, &session);
        assert_eq!(app.form.rough_idea, "Explain this regex");
        assert_eq!(app.form.suggested_questions, "Questions for 2?");
        assert!(app.preview.contains("Explain this regex"));

        // wraps back to "(none)"
        app.apply(Action::Right, &session);
        assert!(app.selected_template(&session).is_none());
    }

    #[test]
    fn commit_appends_history() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let mut app = App::new(&session, &FormDefaults::default());
        type_text(&mut app, &session, "Write me a sales email");

        app.apply(Action::Commit, &session);
        app.apply(Action::Commit, &session);
        assert_eq!(app.history.as_ref().unwrap().len(), 2);
        assert!(!app.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn space_toggles_auto_save() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let mut app = App::new(&session, &FormDefaults::default());
        app.focus = Field::AutoSave;
        app.apply(Action::Insert(' '), &session);
        assert!(!app.form.auto_save);

        type_text(&mut app, &session, "ignored");
        assert_eq!(app.form.rough_idea, "");
    }

    #[test]
    fn export_refused_without_document() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let mut app = App::new(&session, &FormDefaults::default());
        app.apply(Action::Export(export::ExportFormat::Text), &session);
        assert!(app.status.as_ref().unwrap().is_error);
        assert!(!dir.path().join("optimized_prompt.txt").exists());
    }

    #[test]
    fn failed_save_reports_error_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("history.csv"), "timestamp,mode\n\"unterminated")
            .unwrap();
        let session = session(dir.path());
        let mut app = App::new(&session, &FormDefaults::default());
        type_text(&mut app, &session, "Write me a sales email");

        app.apply(Action::Commit, &session);
        let status = app.status.as_ref().unwrap();
        assert!(status.is_error);
        let prefix = "Prompt generated; history not saved: malformed session log";
        assert!(status.message.starts_with(prefix), "{}", status.message);
        assert!(status.message.contains("at row 1: "), "{}", status.message);
        assert!(app.history.as_ref().unwrap_err().contains("at row 1: "));
    }
}

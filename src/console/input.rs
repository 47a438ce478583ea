//! Key mappings for the input modes that take over from list navigation.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    FocusPrev,
    FocusNext,
    Type(char),
    Backspace,
    CyclePrev,
    CycleNext,
    NextStep,
    PrevStep,
    /// Enter: next step, or deploy on the final step.
    Submit,
    TestConnection,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignerAction {
    FocusPrev,
    FocusNext,
    Type(char),
    Backspace,
    CyclePrev,
    CycleNext,
    Activate,
    NextScreen,
    PrevScreen,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Dismiss,
}

fn is_ctrl(key: &KeyEvent, ch: char) -> bool {
    key.code == KeyCode::Char(ch) && key.modifiers.contains(KeyModifiers::CONTROL)
}

pub fn wizard_action_from_key(key: KeyEvent) -> Option<WizardAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl(&key, 'c') {
        return Some(WizardAction::Cancel);
    }
    if is_ctrl(&key, 't') {
        return Some(WizardAction::TestConnection);
    }
    match key.code {
        KeyCode::Up => Some(WizardAction::FocusPrev),
        KeyCode::Down => Some(WizardAction::FocusNext),
        KeyCode::Left => Some(WizardAction::CyclePrev),
        KeyCode::Right => Some(WizardAction::CycleNext),
        KeyCode::Tab => Some(WizardAction::NextStep),
        KeyCode::BackTab => Some(WizardAction::PrevStep),
        KeyCode::Enter => Some(WizardAction::Submit),
        KeyCode::Esc => Some(WizardAction::Cancel),
        KeyCode::Backspace => Some(WizardAction::Backspace),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(WizardAction::Type(ch))
        }
        _ => None,
    }
}

pub fn designer_action_from_key(key: KeyEvent) -> Option<DesignerAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl(&key, 'c') {
        return Some(DesignerAction::Quit);
    }
    match key.code {
        KeyCode::Up => Some(DesignerAction::FocusPrev),
        KeyCode::Down => Some(DesignerAction::FocusNext),
        KeyCode::Left => Some(DesignerAction::CyclePrev),
        KeyCode::Right => Some(DesignerAction::CycleNext),
        KeyCode::Tab => Some(DesignerAction::NextScreen),
        KeyCode::BackTab => Some(DesignerAction::PrevScreen),
        KeyCode::Enter => Some(DesignerAction::Activate),
        KeyCode::Esc => Some(DesignerAction::Quit),
        KeyCode::Backspace => Some(DesignerAction::Backspace),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(DesignerAction::Type(ch))
        }
        _ => None,
    }
}

pub fn confirm_action_from_key(key: KeyEvent) -> Option<ConfirmAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl(&key, 'c') {
        return Some(ConfirmAction::Dismiss);
    }
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(ConfirmAction::Confirm),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(ConfirmAction::Dismiss),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn wizard_keys_type_letters_that_navigate_lists() {
        assert_eq!(
            wizard_action_from_key(key(KeyCode::Char('q'))),
            Some(WizardAction::Type('q'))
        );
        assert_eq!(
            wizard_action_from_key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL)),
            Some(WizardAction::TestConnection)
        );
        assert_eq!(
            wizard_action_from_key(key(KeyCode::Esc)),
            Some(WizardAction::Cancel)
        );
    }

    #[test]
    fn confirm_ignores_unrelated_keys() {
        assert_eq!(confirm_action_from_key(key(KeyCode::Char('x'))), None);
        assert_eq!(
            confirm_action_from_key(key(KeyCode::Char('y'))),
            Some(ConfirmAction::Confirm)
        );
        assert_eq!(
            confirm_action_from_key(key(KeyCode::Esc)),
            Some(ConfirmAction::Dismiss)
        );
    }

    #[test]
    fn designer_tab_switches_screens() {
        assert_eq!(
            designer_action_from_key(key(KeyCode::BackTab)),
            Some(DesignerAction::PrevScreen)
        );
        assert_eq!(
            designer_action_from_key(key(KeyCode::Char('q'))),
            Some(DesignerAction::Type('q'))
        );
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use replconsole::console::{
    console_action_from_key, console_transition, parse_scripted_keys, ConsoleAction,
    ConsoleNavEffect, ConsoleScreen, NavState, ScriptStep,
};

fn key_event(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn console_navigation_module_maps_list_keys() {
    assert_eq!(
        console_action_from_key(ConsoleScreen::Tasks, key_event(KeyCode::Char('a'))),
        Some(ConsoleAction::Add)
    );
    assert_eq!(
        console_action_from_key(ConsoleScreen::Tasks, key_event(KeyCode::Enter)),
        Some(ConsoleAction::Enter)
    );
    assert_eq!(
        console_action_from_key(ConsoleScreen::Endpoints, key_event(KeyCode::Char('t'))),
        None
    );
    assert_eq!(
        console_action_from_key(ConsoleScreen::Agents, key_event(KeyCode::Char('t'))),
        Some(ConsoleAction::ToggleFilter)
    );
    assert_eq!(
        console_action_from_key(
            ConsoleScreen::Agents,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ),
        Some(ConsoleAction::Quit)
    );
}

#[test]
fn console_navigation_module_ignores_key_release() {
    let release = KeyEvent {
        code: KeyCode::Down,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    };
    assert_eq!(console_action_from_key(ConsoleScreen::Agents, release), None);
}

#[test]
fn console_navigation_module_routes_record_actions_to_effects() {
    let mut nav = NavState::start();
    console_transition(&mut nav, ConsoleAction::NextScreen).expect("to endpoints");
    assert_eq!(nav.screen, ConsoleScreen::Endpoints);

    console_transition(&mut nav, ConsoleAction::MoveNext).expect("move");
    let edit = console_transition(&mut nav, ConsoleAction::Edit).expect("edit");
    assert_eq!(
        edit.effect,
        ConsoleNavEffect::OpenEditWizard(ConsoleScreen::Endpoints, 1)
    );
    let delete = console_transition(&mut nav, ConsoleAction::Delete).expect("delete");
    assert_eq!(
        delete.effect,
        ConsoleNavEffect::RequestDelete(ConsoleScreen::Endpoints, 1)
    );
    let add = console_transition(&mut nav, ConsoleAction::Add).expect("add");
    assert_eq!(
        add.effect,
        ConsoleNavEffect::OpenCreateWizard(ConsoleScreen::Endpoints)
    );
}

#[test]
fn console_navigation_module_rejects_list_actions_on_reports() {
    let mut nav = NavState::start();
    console_transition(&mut nav, ConsoleAction::PrevScreen).expect("to reports");
    assert_eq!(nav.screen, ConsoleScreen::Reports);
    let err = console_transition(&mut nav, ConsoleAction::Add).expect_err("invalid");
    assert_eq!(
        err.to_string(),
        "invalid console transition: screen=reports action=add"
    );
}

#[test]
fn console_navigation_module_parses_scripted_keys() {
    let steps = parse_scripted_keys("Down, tab ,wait,text:ok,ctrl-t").expect("parse");
    assert_eq!(
        steps,
        vec![
            ScriptStep::Key(key_event(KeyCode::Down)),
            ScriptStep::Key(key_event(KeyCode::Tab)),
            ScriptStep::Wait,
            ScriptStep::Key(key_event(KeyCode::Char('o'))),
            ScriptStep::Key(key_event(KeyCode::Char('k'))),
            ScriptStep::Key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL)),
        ]
    );
    let err = parse_scripted_keys("up,launch").expect_err("bad token");
    assert!(err.contains("`launch`"));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    CloseViewer,
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleEditPanel,
    ToggleDebugMenu,
}

fn resolve_view_shortcut(key: ShortcutKey) -> Option<ShortcutAction> {
    match key {
        ShortcutKey::Character('+' | '=') => Some(ShortcutAction::ZoomIn),
        ShortcutKey::Character('-') => Some(ShortcutAction::ZoomOut),
        ShortcutKey::Character('0') => Some(ShortcutAction::ResetView),
        ShortcutKey::Character('e') => Some(ShortcutAction::ToggleEditPanel),
        ShortcutKey::Escape => Some(ShortcutAction::CloseViewer),
        _ => None,
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    viewer_open: bool,
) -> Option<ShortcutAction> {
    if !viewer_open {
        return None;
    }

    match (key, modifiers.ctrl, modifiers.shift) {
        (ShortcutKey::Character('d' | 'D'), true, true) => Some(ShortcutAction::ToggleDebugMenu),
        (ShortcutKey::Character('+' | '='), _, _) => Some(ShortcutAction::ZoomIn),
        (_, false, _) => resolve_view_shortcut(key),
        _ => None,
    }
}

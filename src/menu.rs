//! Native menu bar (File, Edit, View) and the commands behind it.
//!
//! Menu items and the page's IPC messages share one set of ids, so both
//! end up as the same [`Command`] on the event loop.

use muda::{Menu, MenuItem, PredefinedMenuItem, Submenu};

use crate::session::Actions;

/// Everything the user can ask the window to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Open,
    Reload,
    Quit,
    Find,
    FindNext,
    FindPrevious,
    ToggleToc,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Open,
        Command::Reload,
        Command::Quit,
        Command::Find,
        Command::FindNext,
        Command::FindPrevious,
        Command::ToggleToc,
    ];

    /// Menu id and IPC message name.
    pub fn id(self) -> &'static str {
        match self {
            Command::Open => "open",
            Command::Reload => "reload",
            Command::Quit => "quit",
            Command::Find => "find",
            Command::FindNext => "find_next",
            Command::FindPrevious => "find_previous",
            Command::ToggleToc => "toggle_toc",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }

    fn label(self) -> &'static str {
        match self {
            Command::Open => "Load...",
            Command::Reload => "Reload",
            Command::Quit => "Quit",
            Command::Find => "Find",
            Command::FindNext => "Find next",
            Command::FindPrevious => "Find previous",
            Command::ToggleToc => "Table of contents",
        }
    }

    /// Script evaluated in the page for commands the page carries out.
    pub fn page_script(self) -> Option<&'static str> {
        match self {
            Command::Find => Some("mdzview.openFind();"),
            Command::FindNext => Some("mdzview.findNext();"),
            Command::FindPrevious => Some("mdzview.findPrev();"),
            Command::ToggleToc => Some("mdzview.toggleToc();"),
            Command::Open | Command::Reload | Command::Quit => None,
        }
    }

    /// Whether the command needs a loaded document.
    pub fn is_enabled(self, actions: Actions) -> bool {
        match self {
            Command::Reload => actions.reload,
            Command::ToggleToc => actions.toggle_toc,
            _ => true,
        }
    }
}

fn item(command: Command, actions: Actions) -> MenuItem {
    MenuItem::with_id(
        command.id(),
        command.label(),
        command.is_enabled(actions),
        None,
    )
}

/// The window's menu bar. Reload and the TOC toggle start out disabled.
///
/// Items carry no accelerators; the page script owns the keyboard shortcuts.
pub struct MenuBar {
    menu: Menu,
    reload: MenuItem,
    toggle_toc: MenuItem,
}

impl MenuBar {
    pub fn new() -> muda::Result<Self> {
        let none = Actions::default();
        let reload = item(Command::Reload, none);
        let toggle_toc = item(Command::ToggleToc, none);
        let menu = Menu::new();

        #[cfg(target_os = "macos")]
        menu.append(&Submenu::with_items(
            "mdzview",
            true,
            &[
                &PredefinedMenuItem::about(None, None),
                &PredefinedMenuItem::separator(),
                &PredefinedMenuItem::quit(None),
            ],
        )?)?;

        let file = Submenu::with_items(
            "File",
            true,
            &[
                &item(Command::Open, none),
                &reload,
                &PredefinedMenuItem::separator(),
                &item(Command::Quit, none),
            ],
        )?;
        let edit = Submenu::with_items(
            "Edit",
            true,
            &[
                &item(Command::Find, none),
                &item(Command::FindNext, none),
                &item(Command::FindPrevious, none),
            ],
        )?;
        let view = Submenu::with_items("View", true, &[&toggle_toc])?;
        menu.append_items(&[&file, &edit, &view])?;

        Ok(Self {
            menu,
            reload,
            toggle_toc,
        })
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Greys out the items that have nothing to act on.
    pub fn sync(&self, actions: Actions) {
        self.reload.set_enabled(Command::Reload.is_enabled(actions));
        self.toggle_toc
            .set_enabled(Command::ToggleToc.is_enabled(actions));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_id(command.id()), Some(command));
        }
        assert_eq!(Command::from_id("rm -rf"), None);
    }

    #[test]
    fn page_messages_map_to_commands() {
        assert_eq!(Command::from_id("open"), Some(Command::Open));
        assert_eq!(Command::from_id("toggle_toc"), Some(Command::ToggleToc));
        assert_eq!(Command::from_id("quit"), Some(Command::Quit));
    }

    #[test]
    fn document_commands_wait_for_a_load() {
        let none = Actions::default();
        let loaded = Actions {
            reload: true,
            toggle_toc: true,
        };

        assert!(!Command::Reload.is_enabled(none));
        assert!(!Command::ToggleToc.is_enabled(none));
        assert!(Command::Open.is_enabled(none));
        assert!(Command::Find.is_enabled(none));
        assert!(Command::Reload.is_enabled(loaded));
        assert!(Command::ToggleToc.is_enabled(loaded));
    }

    #[test]
    fn page_commands_have_scripts() {
        assert_eq!(
            Command::ToggleToc.page_script(),
            Some("mdzview.toggleToc();")
        );
        assert!(Command::FindPrevious.page_script().is_some());
        assert!(Command::Open.page_script().is_none());
        assert!(Command::Reload.page_script().is_none());
    }
}

use std::path::{Path, PathBuf};

use clap::Parser;
use mdzview::assemble::DocumentTemplate;
use mdzview::config::ViewerConfig;
use mdzview::menu::{Command, MenuBar};
use mdzview::protocol::{self, PageSlot, ServedPage};
use mdzview::{links, loader, resources, uri, LoadedDocument, LoaderSettings, Session};
use tao::{
    dpi::LogicalSize,
    event::{Event as TaoEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
    window::{Window, WindowBuilder},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wry::{WebView, WebViewBuilder};

const APP_TITLE: &str = "Markdown Viewer";

const WELCOME: &str = "# Markdown Viewer

Open a markdown file (`.md`) or a zipped markdown bundle (`.mdz`) to get started.

| Shortcut | Action |
|----------|--------|
| Ctrl+O | Open a file |
| Ctrl+R | Reload the current file |
| Ctrl+F | Find in page (F3 / Shift+F3 for next / previous) |
| Ctrl+T | Toggle the table of contents |
| Ctrl+Q | Quit |
";

#[derive(Parser)]
#[command(name = "mdzview", version, about = "View markdown files and zipped markdown bundles")]
struct Cli {
    /// Markdown file (.md) or bundle (.mdz) to open
    file: Option<PathBuf>,

    /// Directory holding style.css, toc.css and the bundled scripts
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,

    /// Also write every assembled page to this file
    #[arg(long, value_name = "PATH")]
    debug_html: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

struct App {
    window: Window,
    webview: WebView,
    menu: MenuBar,
    session: Session,
    page: PageSlot,
}

impl App {
    /// Runs `command`; returns false when the window should close.
    fn run(&mut self, command: Command) -> bool {
        if !command.is_enabled(self.session.actions()) {
            return true;
        }
        match command {
            Command::Open => self.open_dialog(),
            Command::Reload => self.reload(),
            Command::Quit => return false,
            _ => self.run_in_page(command),
        }
        true
    }

    fn open(&mut self, path: &Path) {
        let result = self.session.open(path);
        self.show(result);
    }

    fn open_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Please choose a file")
            .add_filter("Markdown files", &["md"])
            .add_filter("Zipped Markdown files", &["mdz"])
            .pick_file();
        if let Some(path) = picked {
            self.open(&path);
        }
    }

    fn reload(&mut self) {
        match self.session.reload() {
            Ok(Some(document)) => self.show(Ok(document)),
            Ok(None) => {}
            Err(e) => self.show(Err(e)),
        }
    }

    fn run_in_page(&self, command: Command) {
        let Some(script) = command.page_script() else {
            return;
        };
        if let Err(e) = self.webview.evaluate_script(script) {
            tracing::warn!("Could not run {:?} in the page: {}", command, e);
        }
    }

    fn show(&mut self, result: mdzview::Result<LoadedDocument>) {
        match result {
            Ok(document) => {
                self.window.set_title(&document.title);
                let target = document.uri.clone();
                self.page.replace(ServedPage {
                    uri: document.uri,
                    path: Some(document.path),
                    html: document.html,
                });
                self.navigate(&target);
            }
            Err(e) => {
                tracing::error!("{}", e);
                let message = format!("# Error\n\nCould not load file:\n\n    {}\n", e);
                let html = loader::message_page(&message, self.session.settings());
                self.page.replace(ServedPage::at_root(html));
                self.navigate(&uri::root());
            }
        }
        self.menu.sync(self.session.actions());
    }

    fn navigate(&self, target: &str) {
        if let Err(e) = self.webview.load_url(target) {
            tracing::error!("Could not load {} into the webview: {}", target, e);
        }
    }
}

fn build_webview(
    window: &Window,
    proxy: EventLoopProxy<Command>,
    page: &PageSlot,
) -> Result<WebView, Box<dyn std::error::Error>> {
    let protocol_page = page.clone();
    let navigation_page = page.clone();

    let builder = WebViewBuilder::new()
        .with_custom_protocol(uri::SCHEME.to_string(), move |_id, request| {
            protocol::handle(&protocol_page, &request)
        })
        .with_ipc_handler(move |req| match Command::from_id(req.body()) {
            Some(command) => {
                let _ = proxy.send_event(command);
            }
            None => tracing::debug!("Ignoring IPC message {:?}", req.body()),
        })
        .with_navigation_handler(move |url| {
            if url.starts_with("about:") || url.starts_with("data:") {
                return true;
            }
            if uri::targets_document(&url, &navigation_page.uri()) {
                return true;
            }
            links::open_external(&url);
            false
        })
        .with_url(page.uri());

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    let webview = builder.build(window)?;

    // tao windows on Linux are GTK; wry has to be packed into their vbox.
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window
            .default_vbox()
            .ok_or("window has no GTK container for the webview")?;
        builder.build_gtk(vbox)?
    };

    Ok(webview)
}

fn attach_menu(menu: &MenuBar, window: &Window) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_os = "windows")]
    {
        use tao::platform::windows::WindowExtWindows;
        // SAFETY: the handle belongs to `window`, which outlives the menu.
        unsafe { menu.menu().init_for_hwnd(window.hwnd() as _)? };
    }

    #[cfg(target_os = "macos")]
    {
        let _ = window;
        menu.menu().init_for_nsapp();
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        use tao::platform::unix::WindowExtUnix;
        menu.menu()
            .init_for_gtk_window(window.gtk_window(), window.default_vbox())?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "mdzview=info".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::load_default()?,
    };
    if cli.resources.is_some() {
        config.resource_dir = cli.resources;
    }
    if cli.debug_html.is_some() {
        config.debug_html = cli.debug_html;
    }

    let resource_dir = resources::resolve(config.resource_dir.as_deref())?;
    let settings = LoaderSettings {
        template: DocumentTemplate::new(uri::for_path(&resource_dir)),
        markdown: config.markdown,
        debug_html: config.debug_html,
    };
    let session = Session::new(settings);
    let page = PageSlot::new(ServedPage::at_root(loader::message_page(
        WELCOME,
        session.settings(),
    )));

    let event_loop = EventLoopBuilder::<Command>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let menu_proxy = proxy.clone();
    muda::MenuEvent::set_event_handler(Some(move |event: muda::MenuEvent| {
        if let Some(command) = Command::from_id(event.id().0.as_str()) {
            let _ = menu_proxy.send_event(command);
        }
    }));

    let window = WindowBuilder::new()
        .with_title(APP_TITLE)
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
        .build(&event_loop)?;
    let menu = MenuBar::new()?;
    attach_menu(&menu, &window)?;
    let webview = build_webview(&window, proxy, &page)?;

    let mut app = App {
        window,
        webview,
        menu,
        session,
        page,
    };

    if let Some(path) = cli.file {
        let path = path.canonicalize().unwrap_or(path);
        app.open(&path);
    }

    event_loop.run(move |event, _target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            TaoEvent::Opened { urls } => {
                for url in urls {
                    if let Ok(path) = url.to_file_path() {
                        app.open(&path);
                    }
                }
            }
            TaoEvent::UserEvent(command) => {
                if !app.run(command) {
                    *control_flow = ControlFlow::Exit;
                }
            }
            TaoEvent::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                *control_flow = ControlFlow::Exit;
            }
            // run() never returns, so Session's Drop would not get a chance.
            TaoEvent::LoopDestroyed => app.session.cleanup(),
            _ => {}
        }
    });
}

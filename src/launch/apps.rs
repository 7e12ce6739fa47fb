//! Known-application table
//!
//! Static mapping from spoken application names to launch targets. Names
//! are matched against the full lowercased command target, so the table
//! keys are all lowercase.

/// How a known application is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTarget {
    /// Hand the string to the OS default-open mechanism. Covers executable
    /// names and URI schemes alike.
    Open(&'static str),
    /// The code editor gets its own multi-step resolution.
    CodeEditor,
}

pub const KNOWN_APPS: &[(&str, AppTarget)] = &[
    ("notepad", AppTarget::Open("notepad.exe")),
    ("paint", AppTarget::Open("mspaint.exe")),
    ("file explorer", AppTarget::Open("explorer.exe")),
    ("explorer", AppTarget::Open("explorer.exe")),
    ("calculator", AppTarget::Open("calc.exe")),
    ("word", AppTarget::Open("winword.exe")),
    ("excel", AppTarget::Open("excel.exe")),
    ("powerpoint", AppTarget::Open("powerpnt.exe")),
    ("onenote", AppTarget::Open("onenote.exe")),
    ("outlook", AppTarget::Open("outlook.exe")),
    ("edge", AppTarget::Open("msedge.exe")),
    ("chrome", AppTarget::Open("chrome.exe")),
    ("control panel", AppTarget::Open("control.exe")),
    ("cmd", AppTarget::Open("cmd.exe")),
    ("terminal", AppTarget::Open("wt.exe")),
    ("store", AppTarget::Open("ms-windows-store:")),
    ("settings", AppTarget::Open("ms-settings:")),
    ("camera", AppTarget::Open("microsoft.windows.camera:")),
    ("photos", AppTarget::Open("ms-photos:")),
    ("vs code", AppTarget::CodeEditor),
    ("visual studio code", AppTarget::CodeEditor),
    ("visualstudio code", AppTarget::CodeEditor),
];

/// Look up a lowercased target in the table.
pub fn lookup_app(name: &str) -> Option<AppTarget> {
    KNOWN_APPS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, target)| *target)
}

/// Bare search-path command for the code editor.
pub const CODE_EDITOR_COMMAND: &str = "code";

/// Executable-named variant tried when the bare command is missing.
#[cfg(target_os = "windows")]
pub const CODE_EDITOR_VARIANT: &str = "code.exe";
#[cfg(not(target_os = "windows"))]
pub const CODE_EDITOR_VARIANT: &str = "code-oss";

/// Well-known install locations for the code editor, in probe order.
#[cfg(target_os = "windows")]
pub fn code_editor_install_paths() -> Vec<String> {
    let local_appdata = std::env::var("LOCALAPPDATA")
        .unwrap_or_else(|_| r"C:\Users\Default\AppData\Local".to_string());
    vec![
        format!(r"{}\Programs\Microsoft VS Code\Code.exe", local_appdata),
        r"C:\Program Files\Microsoft VS Code\Code.exe".to_string(),
        r"C:\Program Files (x86)\Microsoft VS Code\Code.exe".to_string(),
    ]
}

#[cfg(target_os = "macos")]
pub fn code_editor_install_paths() -> Vec<String> {
    vec![
        "/Applications/Visual Studio Code.app/Contents/Resources/app/bin/code".to_string(),
        "/usr/local/bin/code".to_string(),
    ]
}

#[cfg(all(unix, not(target_os = "macos")))]
pub fn code_editor_install_paths() -> Vec<String> {
    vec![
        "/usr/bin/code".to_string(),
        "/usr/local/bin/code".to_string(),
        "/snap/bin/code".to_string(),
    ]
}

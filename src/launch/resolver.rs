//! Launch resolution engine
//!
//! Turns a free-text target into an "open" action by walking an ordered
//! fallback chain. Guarded strategies (URL-shaped targets, explicit website
//! markers, known applications) claim the target when their guard matches:
//! if a claimed strategy fails, resolution stops with that strategy's
//! failure report instead of falling through. The unguarded strategies
//! (website guess, literal command, shell start) run in sequence until one
//! succeeds. The chain always stops at the first success.

use std::sync::Arc;

use tracing::debug;

use crate::journal::SharedJournal;
use crate::launch::apps::{self, AppTarget};
use crate::launch::desktop::Desktop;
use crate::speech::SpeechHandle;
use crate::GoferError;

/// Resolution strategies, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    UrlShaped,
    WebsiteMarker,
    KnownApp,
    WebsiteGuess,
    Executable,
    ShellStart,
}

/// How one attempted action went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed(String),
}

/// One recorded action, for diagnostics.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub strategy: Strategy,
    pub detail: String,
    pub outcome: AttemptOutcome,
}

/// Trail of a full resolution run.
#[derive(Debug, Clone)]
pub struct LaunchReport {
    pub target: String,
    pub attempts: Vec<Attempt>,
    pub resolved: Option<Strategy>,
}

impl LaunchReport {
    pub fn succeeded(&self) -> bool {
        self.resolved.is_some()
    }
}

enum StepOutcome {
    /// Guard did not match; evaluate the next strategy.
    Skip,
    /// Target opened; chain stops.
    Done(Strategy),
    /// Strategy claimed the target and failed; chain stops, already reported.
    Stop,
    /// Attempted and failed; evaluate the next strategy.
    Continue,
}

type Step = fn(&LaunchResolver, &str, &str, &mut Vec<Attempt>) -> StepOutcome;

const CHAIN: &[Step] = &[
    step_url_shaped,
    step_website_marker,
    step_known_app,
    step_website_guess,
    step_executable,
    step_shell_start,
];

/// Resolves "open <target>" requests against the host system.
pub struct LaunchResolver {
    desktop: Arc<dyn Desktop>,
    journal: SharedJournal,
    speech: SpeechHandle,
}

impl LaunchResolver {
    pub fn new(desktop: Arc<dyn Desktop>, journal: SharedJournal, speech: SpeechHandle) -> Self {
        Self {
            desktop,
            journal,
            speech,
        }
    }

    /// Resolve and execute an "open" request, reporting progress to the
    /// journal and confirmations or apologies to the speech queue.
    pub fn resolve(&self, target: &str) -> LaunchReport {
        let raw = target.trim().to_string();
        let lower = raw.to_lowercase();
        self.journal.log(&format!("Trying to open: {}", raw));

        let mut attempts = Vec::new();
        let mut resolved = None;
        let mut claimed = false;

        for step in CHAIN {
            match step(self, &raw, &lower, &mut attempts) {
                StepOutcome::Skip | StepOutcome::Continue => {}
                StepOutcome::Done(strategy) => {
                    resolved = Some(strategy);
                    break;
                }
                StepOutcome::Stop => {
                    claimed = true;
                    break;
                }
            }
        }

        if resolved.is_none() && !claimed {
            let err = GoferError::ResolutionExhausted(raw.clone());
            self.journal.log(&format!("Could not open: {}", raw));
            self.speech.speak(err.user_message());
        }
        debug!(
            target = %raw,
            ?resolved,
            attempts = attempts.len(),
            "launch resolution finished"
        );

        LaunchReport {
            target: raw,
            attempts,
            resolved,
        }
    }

    /// Normalize and open a website. Success confirms by voice; failure is
    /// journaled and left to the caller.
    fn open_website(&self, site: &str, strategy: Strategy, attempts: &mut Vec<Attempt>) -> bool {
        let url = normalize_website(site);
        self.journal.log(&format!("Opening website: {}", url));
        match self.desktop.open_url(&url) {
            Ok(()) => {
                self.speech.speak(format!("Opening {}", site));
                attempts.push(Attempt {
                    strategy,
                    detail: url,
                    outcome: AttemptOutcome::Succeeded,
                });
                true
            }
            Err(e) => {
                self.journal
                    .log(&format!("Failed to open website {}: {}", site, e));
                attempts.push(Attempt {
                    strategy,
                    detail: url,
                    outcome: AttemptOutcome::Failed(e.to_string()),
                });
                false
            }
        }
    }

    fn launch_executable(
        &self,
        path_or_cmd: &str,
        strategy: Strategy,
        attempts: &mut Vec<Attempt>,
    ) -> bool {
        match self.desktop.launch(path_or_cmd) {
            Ok(()) => {
                attempts.push(Attempt {
                    strategy,
                    detail: path_or_cmd.to_string(),
                    outcome: AttemptOutcome::Succeeded,
                });
                true
            }
            Err(e) => {
                self.journal
                    .log(&format!("attempt to run '{}' failed: {}", path_or_cmd, e));
                attempts.push(Attempt {
                    strategy,
                    detail: path_or_cmd.to_string(),
                    outcome: AttemptOutcome::Failed(e.to_string()),
                });
                false
            }
        }
    }
}

fn step_url_shaped(
    r: &LaunchResolver,
    raw: &str,
    _lower: &str,
    attempts: &mut Vec<Attempt>,
) -> StepOutcome {
    if !looks_like_url(raw) {
        return StepOutcome::Skip;
    }
    if r.open_website(raw, Strategy::UrlShaped, attempts) {
        return StepOutcome::Done(Strategy::UrlShaped);
    }
    r.journal.log(&format!("Could not open website: {}", raw));
    r.speech
        .speak(format!("Sorry, I couldn't open the website {}.", raw));
    StepOutcome::Stop
}

fn strip_website_marker(raw: &str) -> Option<&str> {
    for marker in ["website ", "site "] {
        if let Some(prefix) = raw.get(..marker.len()) {
            if prefix.eq_ignore_ascii_case(marker) {
                return raw.get(marker.len()..).map(str::trim);
            }
        }
    }
    None
}

fn step_website_marker(
    r: &LaunchResolver,
    raw: &str,
    _lower: &str,
    attempts: &mut Vec<Attempt>,
) -> StepOutcome {
    let stripped = match strip_website_marker(raw) {
        Some(s) => s,
        None => return StepOutcome::Skip,
    };
    if !stripped.is_empty() && r.open_website(stripped, Strategy::WebsiteMarker, attempts) {
        return StepOutcome::Done(Strategy::WebsiteMarker);
    }
    r.journal.log("Could not parse website target.");
    r.speech.speak("Sorry, I couldn't parse that website.");
    StepOutcome::Stop
}

fn step_known_app(
    r: &LaunchResolver,
    raw: &str,
    lower: &str,
    attempts: &mut Vec<Attempt>,
) -> StepOutcome {
    match apps::lookup_app(lower) {
        None => StepOutcome::Skip,
        Some(AppTarget::CodeEditor) => resolve_code_editor(r, attempts),
        Some(AppTarget::Open(app)) => open_mapped_app(r, raw, app, attempts),
    }
}

fn resolve_code_editor(r: &LaunchResolver, attempts: &mut Vec<Attempt>) -> StepOutcome {
    r.journal.log("Trying VS Code via 'code' command.");
    if r.launch_executable(apps::CODE_EDITOR_COMMAND, Strategy::KnownApp, attempts) {
        r.speech.speak("Opening Visual Studio Code.");
        return StepOutcome::Done(Strategy::KnownApp);
    }
    if r.launch_executable(apps::CODE_EDITOR_VARIANT, Strategy::KnownApp, attempts) {
        r.speech.speak("Opening Visual Studio Code.");
        return StepOutcome::Done(Strategy::KnownApp);
    }

    for candidate in apps::code_editor_install_paths() {
        r.journal.log(&format!("Trying VS Code path: {}", candidate));
        if !r.desktop.path_exists(&candidate) {
            continue;
        }
        match r.desktop.launch(&candidate) {
            Ok(()) => {
                attempts.push(Attempt {
                    strategy: Strategy::KnownApp,
                    detail: candidate,
                    outcome: AttemptOutcome::Succeeded,
                });
                r.speech.speak("Opening Visual Studio Code.");
                return StepOutcome::Done(Strategy::KnownApp);
            }
            Err(e) => {
                r.journal
                    .log(&format!("Failed to launch {}: {}", candidate, e));
                attempts.push(Attempt {
                    strategy: Strategy::KnownApp,
                    detail: candidate,
                    outcome: AttemptOutcome::Failed(e.to_string()),
                });
            }
        }
    }

    match r.desktop.default_open(apps::CODE_EDITOR_COMMAND) {
        Ok(()) => {
            attempts.push(Attempt {
                strategy: Strategy::KnownApp,
                detail: format!("default-open {}", apps::CODE_EDITOR_COMMAND),
                outcome: AttemptOutcome::Succeeded,
            });
            r.speech.speak("Opening Visual Studio Code.");
            return StepOutcome::Done(Strategy::KnownApp);
        }
        Err(e) => {
            r.journal
                .log(&format!("VS Code default-open fallback failed: {}", e));
            attempts.push(Attempt {
                strategy: Strategy::KnownApp,
                detail: format!("default-open {}", apps::CODE_EDITOR_COMMAND),
                outcome: AttemptOutcome::Failed(e.to_string()),
            });
        }
    }

    r.journal.log("Could not open Visual Studio Code.");
    r.speech.speak("Sorry, I couldn't open Visual Studio Code.");
    StepOutcome::Stop
}

fn open_mapped_app(
    r: &LaunchResolver,
    raw: &str,
    app: &'static str,
    attempts: &mut Vec<Attempt>,
) -> StepOutcome {
    match r.desktop.default_open(app) {
        Ok(()) => {
            attempts.push(Attempt {
                strategy: Strategy::KnownApp,
                detail: app.to_string(),
                outcome: AttemptOutcome::Succeeded,
            });
            r.speech.speak(format!("Opening {}", raw));
            StepOutcome::Done(Strategy::KnownApp)
        }
        Err(e) => {
            r.journal
                .log(&format!("default-open for {} failed: {}", app, e));
            attempts.push(Attempt {
                strategy: Strategy::KnownApp,
                detail: app.to_string(),
                outcome: AttemptOutcome::Failed(e.to_string()),
            });
            if r.launch_executable(app, Strategy::KnownApp, attempts) {
                r.speech.speak(format!("Opening {}", raw));
                return StepOutcome::Done(Strategy::KnownApp);
            }
            r.journal.log(&format!("Could not open mapped app {}.", raw));
            r.speech.speak(format!("Sorry, I couldn't open {}.", raw));
            StepOutcome::Stop
        }
    }
}

fn step_website_guess(
    r: &LaunchResolver,
    _raw: &str,
    lower: &str,
    attempts: &mut Vec<Attempt>,
) -> StepOutcome {
    r.journal
        .log("Not a known app - trying website fallback (www.<target>.com)");
    let compact: String = lower.split_whitespace().collect();
    let guess = format!("www.{}.com", compact);
    if r.open_website(&guess, Strategy::WebsiteGuess, attempts) {
        StepOutcome::Done(Strategy::WebsiteGuess)
    } else {
        StepOutcome::Continue
    }
}

fn step_executable(
    r: &LaunchResolver,
    raw: &str,
    _lower: &str,
    attempts: &mut Vec<Attempt>,
) -> StepOutcome {
    r.journal
        .log(&format!("Trying to run as command/exe: {}", raw));
    if r.launch_executable(raw, Strategy::Executable, attempts) {
        r.speech.speak(format!("Opening {}", raw));
        StepOutcome::Done(Strategy::Executable)
    } else {
        StepOutcome::Continue
    }
}

fn step_shell_start(
    r: &LaunchResolver,
    raw: &str,
    _lower: &str,
    attempts: &mut Vec<Attempt>,
) -> StepOutcome {
    match r.desktop.shell_start(raw) {
        Ok(()) => {
            attempts.push(Attempt {
                strategy: Strategy::ShellStart,
                detail: raw.to_string(),
                outcome: AttemptOutcome::Succeeded,
            });
            r.speech.speak(format!("Opening {}", raw));
            StepOutcome::Done(Strategy::ShellStart)
        }
        Err(e) => {
            r.journal
                .log(&format!("shell fallback failed for {}: {}", raw, e));
            attempts.push(Attempt {
                strategy: Strategy::ShellStart,
                detail: raw.to_string(),
                outcome: AttemptOutcome::Failed(e.to_string()),
            });
            StepOutcome::Continue
        }
    }
}

/// A target with a scheme, or a dot and no internal space, reads as a web
/// address.
pub fn looks_like_url(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    if t.starts_with("http://") || t.starts_with("https://") {
        return true;
    }
    t.contains('.') && !t.contains(' ')
}

/// Expand a bare site name into a full https URL.
pub fn normalize_website(target: &str) -> String {
    let t = target.trim();
    if t.starts_with("http://") || t.starts_with("https://") {
        return t.to_string();
    }
    if !t.contains('.') {
        return format!("https://www.{}.com", t);
    }
    format!("https://{}", t)
}

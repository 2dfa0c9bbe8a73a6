//! Platform capability calls: speech, picker, audio, reCAPTCHA, share.
//!
//! These constructors declare *intent*: each builds an [`Invoke`]
//! expression with the capability's argument contract. On a real target the
//! platform dispatches the call to the native capability; in this core (and
//! in the test harness) they are inert no-ops, recorded only so structural
//! tests can assert the call contract.
//!
//! [`Invoke`]: crate::expr::Expr::Invoke

use crate::expr::{invoke, obj, Expr};

/// Start speech recognition; `on_result` runs with the recognition results
/// as its event payload.
pub fn listen(on_result: Expr) -> Expr {
    invoke("speech.listen", [on_result])
}

/// Speak `text` aloud.
pub fn speak(text: Expr, lang: Expr, rate: Expr) -> Expr {
    invoke(
        "speech.speak",
        [obj([("text", text), ("lang", lang), ("rate", rate)])],
    )
}

/// Open the platform date picker; `ok` runs with the chosen value.
pub fn pick_date(ok: Expr) -> Expr {
    invoke("picker.date", [ok])
}

/// Play an audio source.
pub fn play(src: Expr) -> Expr {
    invoke("audio.play", [src])
}

/// Start recording; `on_data` runs with the captured blob reference.
pub fn record(on_data: Expr) -> Expr {
    invoke("audio.record", [on_data])
}

/// Stop audio playback and recording.
pub fn stop() -> Expr {
    invoke("audio.stop", [])
}

/// Execute a reCAPTCHA challenge; `callback` runs with the issued code.
pub fn execute_recaptcha(callback: Expr) -> Expr {
    invoke("recaptcha.execute", [callback])
}

/// Invoke the platform share sheet with a `{url, title, text}` record.
pub fn share(config: Expr) -> Expr {
    invoke("device.share", [config])
}

// ===========================================================================
// Tests
// ===========================================================================

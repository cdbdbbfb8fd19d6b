//! Console output of bruno-xray
//!
//! Progress lines carry a `bruno-xray: ` prefix so they stand out between the
//! output of the Bruno runs. Outcome lines get a colored `done` or `error`
//! marker.

use lazy_static::lazy_static;
use std::io::Write;
use std::sync::Mutex;

/// Execute a function with exclusive access to console output
/// Keeps Bruno's inherited output from interleaving with ours
fn status_lock<F>(f: F)
where
    F: FnOnce(),
{
    lazy_static! {
        static ref LOCK: Mutex<()> = Mutex::new(());
    }
    let _guard = LOCK.lock();
    f();
}

/// Print the "bruno-xray: " prefix for status messages
fn print_status_header() {
    print!("bruno-xray: ");
}

/// Print colored text to terminal, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        if let Some(ref mut t) = term::stdout() {
            if t.fg(fg).is_err() {
                return false;
            }
            let _ = t.attr(term::Attr::Bold);
            if write!(t, "{}", s).is_err() {
                return false;
            }
            let _ = t.reset();
        }

        true
    }
}

/// Print a status message with "bruno-xray: " prefix
pub fn status(s: &str) {
    status_lock(|| {
        print_status_header();
        println!("{}", s);
    });
}

/// Print a status message with a green "done" marker
pub fn print_success(msg: &str) {
    status_lock(|| {
        print_status_header();
        print_marked("done", term::color::BRIGHT_GREEN, msg);
    });
}

/// Print an error message with colored "error" prefix, set apart by blank lines
pub fn print_error(msg: &str) {
    status_lock(|| {
        println!();
        print_marked("error", term::color::BRIGHT_RED, msg);
        println!();
    });
}

fn print_marked(marker: &str, color: term::color::Color, msg: &str) {
    print_color(marker, color);
    println!(": {}", msg);
}

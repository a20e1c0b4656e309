//! Opening bundles through `NSWorkspace`.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2_app_kit::{NSRunningApplication, NSWorkspace, NSWorkspaceOpenConfiguration};
use objc2_foundation::{NSArray, NSError, NSString, NSURL};

/// How long to wait for Launch Services to report back.
const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration that passes `args` and keeps the bundle out of the recent
/// items list.
#[allow(unused_unsafe)]
pub(super) fn open_configuration(args: &[String]) -> Retained<NSWorkspaceOpenConfiguration> {
    let arguments: Vec<Retained<NSString>> = args.iter().map(|a| NSString::from_str(a)).collect();
    // SAFETY: plain property setters on a freshly created configuration.
    unsafe {
        let configuration = NSWorkspaceOpenConfiguration::configuration();
        configuration.setAddsToRecentItems(false);
        configuration.setArguments(&NSArray::from_retained_slice(&arguments));
        configuration
    }
}

/// Ask Launch Services to open `bundle` and wait for its answer.
///
/// A running instance is reused. Returns the error description AppKit hands
/// to the completion handler.
#[allow(unused_unsafe)]
pub(super) fn open_application(bundle: &Path, args: &[String]) -> Result<(), String> {
    let path = NSString::from_str(&bundle.display().to_string());
    let configuration = open_configuration(args);

    let (tx, rx) = mpsc::channel::<Option<String>>();
    let handler = RcBlock::new(move |_app: *mut NSRunningApplication, error: *mut NSError| {
        // SAFETY: AppKit passes null or a valid NSError.
        let message = unsafe { error.as_ref() }.map(|e| e.localizedDescription().to_string());
        let _ = tx.send(message);
    });

    // SAFETY: the handler is 'static and only sends on a channel; AppKit calls
    // it once on a concurrent queue.
    unsafe {
        let url = NSURL::fileURLWithPath(&path);
        NSWorkspace::sharedWorkspace().openApplicationAtURL_configuration_completionHandler(
            &url,
            &configuration,
            Some(&*handler),
        );
    }

    match rx.recv_timeout(OPEN_TIMEOUT) {
        Ok(None) => Ok(()),
        Ok(Some(message)) => Err(message),
        Err(e) => Err(format!("no answer from Launch Services: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_skips_recent_items() {
        let configuration = open_configuration(&["https://check.torproject.org/".to_string()]);
        #[allow(unused_unsafe)]
        let (recent, count) =
            unsafe { (configuration.addsToRecentItems(), configuration.arguments().count()) };
        assert!(!recent);
        assert_eq!(count, 1);
    }
}

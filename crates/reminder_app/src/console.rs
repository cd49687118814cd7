use reminder_core::notifications::AlertSink;

/// Renders alerts on stdout, the CLI's closest thing to a dialog.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleAlert;

impl AlertSink for ConsoleAlert {
    fn show(&self, title: &str, message: &str) {
        tracing::debug!(%title, "showing alert");
        println!("{title}\n  {message}");
    }
}

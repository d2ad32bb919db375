/// Interactive controls the controller can mark busy while a request is in
/// flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    UploadSubmit,
}

/// Seam to the rendering host. The controller and monitor talk to the view
/// only through this trait; the host decides what a reload or a file save
/// actually means.
pub trait AdminSurface: Send + Sync {
    /// Replace the current view with a fresh one.
    fn reload(&self);
    /// Open a URL outside the current view.
    fn open_external(&self, url: &str);
    /// Offer `contents` to the user as a downloadable file.
    fn save_file(&self, name: &str, contents: &[u8]);
    /// Ask the user to confirm a destructive action.
    fn confirm(&self, prompt: &str) -> bool;
    fn set_control_busy(&self, control: Control, busy: bool);
    /// Clear the upload form's file selection after a successful upload.
    fn reset_upload_form(&self);
    /// Present a read-only document, such as the active specification.
    fn show_document(&self, title: &str, body: &str);
}

/// Surface that does nothing and approves every confirmation.
pub struct NullSurface;

impl AdminSurface for NullSurface {
    fn reload(&self) {}
    fn open_external(&self, _url: &str) {}
    fn save_file(&self, _name: &str, _contents: &[u8]) {}
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
    fn set_control_busy(&self, _control: Control, _busy: bool) {}
    fn reset_upload_form(&self) {}
    fn show_document(&self, _title: &str, _body: &str) {}
}

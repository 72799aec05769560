/// Title of every window opened by the launcher.
pub const MONGOOSE_OS_TITLE: &str = "Mongoose OS";
pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

/// Window size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHW {
    pub width: u32,
    pub height: u32,
}

/// Everything the runtime needs to build one window.
///
/// Built once per launch and handed to [`WindowingRuntime::new_window`] by value.
///
/// [`WindowingRuntime::new_window`]: crate::runtime::WindowingRuntime::new_window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub root_url: String,
    pub has_frame: bool,
    pub size: SizeHW,
    pub title: String,
}

impl WindowOptions {
    /// The fixed options of the Mongoose OS UI window: framed, 1280×720, titled "Mongoose OS".
    pub fn mongoose_os(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            has_frame: true,
            size: SizeHW {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            },
            title: MONGOOSE_OS_TITLE.to_owned(),
        }
    }
}

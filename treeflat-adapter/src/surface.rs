use treeflat::{ItemInfo, NestMode};

/// The list widget a [`crate::Controller`] drives.
///
/// The surface pulls rows on its own schedule (through [`crate::Controller::projection`] or
/// [`crate::Controller::render_at`]); the controller only tells it when the rows changed.
pub trait Surface {
    /// Called once after every mutation that changed the flat sequence.
    fn notify_changed(&mut self);

    /// Whether every expandable node should be materialized as soon as it is built.
    fn always_expanded(&self) -> bool {
        false
    }

    /// The nest mode used by toggles and plain expansions.
    fn nest_mode(&self) -> NestMode {
        NestMode::Concurrent
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn notify_changed(&mut self) {
        (**self).notify_changed();
    }

    fn always_expanded(&self) -> bool {
        (**self).always_expanded()
    }

    fn nest_mode(&self) -> NestMode {
        (**self).nest_mode()
    }
}

/// Produces the visual for one row.
///
/// `previous` is a visual from an earlier call that the renderer may reuse instead of building a
/// new one.
pub trait Renderer<T> {
    type Visual;

    fn render(&self, item: &T, previous: Option<Self::Visual>, info: ItemInfo) -> Self::Visual;
}

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::router::Navigator;
use crate::view_model::AnyViewModel;

/// How a routed destination is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStyle {
    Push,
    Sheet,
    FullScreenCover,
}

/// Content of the single alert slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertState {
    pub title: String,
    pub message: String,
}

/// What a view builder produced for a stack entry.
pub enum Rendered {
    /// No registered builder recognized the entry.
    Empty,
    /// A node produced by the rendering layer.
    Node(Box<dyn Any>),
    /// The entry is a nested flow; render it with its own navigator.
    Navigator(Navigator),
}

impl Rendered {
    pub fn is_empty(&self) -> bool {
        matches!(self, Rendered::Empty)
    }

    pub fn downcast<T: 'static>(self) -> Option<T> {
        match self {
            Rendered::Node(node) => node.downcast::<T>().ok().map(|node| *node),
            _ => None,
        }
    }
}

impl fmt::Debug for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Empty => f.write_str("Rendered::Empty"),
            Rendered::Node(_) => f.write_str("Rendered::Node(..)"),
            Rendered::Navigator(navigator) => f.debug_tuple("Rendered::Navigator").field(navigator).finish(),
        }
    }
}

/// Given any view model, build a node if its state type is recognized.
pub type ViewBuilder = Rc<dyn Fn(&AnyViewModel) -> Option<Rendered>>;

/// Strip the module path from a type name, keeping generic arguments readable.
pub(crate) fn short_type_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    match base.rfind("::") {
        Some(index) => &name[index + 2..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_type_name_drops_module_path() {
        assert_eq!(short_type_name("app::home::HomeState"), "HomeState");
        assert_eq!(short_type_name("HomeState"), "HomeState");
        assert_eq!(short_type_name("app::List<app::Row>"), "List<app::Row>");
    }

    #[test]
    fn rendered_downcast_returns_node() {
        let node = Rendered::Node(Box::new(7_u8));
        assert_eq!(node.downcast::<u8>(), Some(7));
        assert!(Rendered::Empty.downcast::<u8>().is_none());
    }
}

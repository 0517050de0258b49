//! Reducer for [`NavigationFlow`].

use std::any::Any;
use std::rc::Rc;

use super::flow::NavigationFlow;
use super::info::NavigatorInfo;
use super::types::AlertState;
use crate::mvi::{BusinessState, Procedure, Reducer};
use crate::view_model::AnyViewModel;

#[derive(Debug, Clone)]
pub enum NavigationAction {
    Push(AnyViewModel),
    PresentSheet(AnyViewModel),
    PresentFullScreenCover(AnyViewModel),
    Pop,
    PopToRoot,
    DismissSheet,
    DismissFullScreenCover,
    Dismiss,
    Alert { title: String, message: String },
    DismissAlert,
    SubEvent(Rc<dyn Any>),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationFeature;

impl Reducer for NavigationFeature {
    type State = NavigationFlow;
    type Action = NavigationAction;
    type Event = Rc<dyn Any>;
    type Command = ();

    fn reduce(&self, flow: &mut NavigationFlow, action: NavigationAction) -> Procedure<NavigationAction> {
        if let NavigationAction::SubEvent(event) = action {
            if let Some(output) = flow.handle_sub_event(event) {
                flow.fire_event(output);
            }
            return Procedure::none();
        }

        let Some(shared) = flow.manager().cloned() else {
            tracing::warn!(?action, "Navigation action before the flow was mounted");
            return Procedure::none();
        };
        let mut manager = shared.borrow_mut();

        match action {
            NavigationAction::Push(view_model) => match view_model.downcast::<NavigationFlow>() {
                Some(nested) => {
                    let state = nested.state();
                    let Ok(mut nested) = state.try_borrow_mut() else {
                        tracing::warn!("Nested flow is busy, push ignored");
                        return Procedure::none();
                    };
                    let Some(root) = nested.root_info().cloned() else {
                        tracing::warn!(flow = nested.id(), "Nested flow has no root, push ignored");
                        return Procedure::none();
                    };
                    manager.create_new_path(nested.id(), root, Rc::clone(nested.view_builder()));
                    nested.adopt(Rc::clone(&shared));
                }
                None => manager.push(NavigatorInfo::new(view_model)),
            },
            NavigationAction::PresentSheet(view_model) => {
                manager.set_sheet(Some(NavigatorInfo::new(view_model)));
            }
            NavigationAction::PresentFullScreenCover(view_model) => {
                manager.set_full_screen_cover(Some(NavigatorInfo::new(view_model)));
            }
            NavigationAction::Pop => manager.pop(),
            NavigationAction::PopToRoot => manager.pop_to_root(),
            NavigationAction::DismissSheet => manager.set_sheet(None),
            NavigationAction::DismissFullScreenCover => manager.set_full_screen_cover(None),
            NavigationAction::Dismiss => manager.dismiss(),
            NavigationAction::Alert { title, message } => {
                manager.set_alert(Some(AlertState { title, message }));
            }
            NavigationAction::DismissAlert => manager.set_alert(None),
            NavigationAction::SubEvent(_) => {}
        }

        Procedure::none()
    }
}

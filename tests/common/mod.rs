//! Shared fixture features.

#![allow(dead_code, unused_imports)]

use std::cell::RefCell;
use std::rc::Rc;

use waypoint::navigation::{Rendered, ViewBuilder, ViewDescriptor};
use waypoint::{
    lens, AnyViewModel, BusinessState, Channels, DismissType, FlowRoute, Identified, IdentifiedVec, NavigatableState,
    NavigationChannels, NavigationFlow, Navigator, NavigatorInfo, Procedure, Reducer, RouteStyle,
    ScreenRoute, StateRef, ViewModel,
};

// -- Counter: leaf with no events --------------------------------------------

pub struct CounterState {
    channels: Channels<Self>,
    pub count: i32,
}

impl CounterState {
    pub fn new(count: i32) -> Self {
        Self {
            channels: Channels::default(),
            count,
        }
    }
}

impl BusinessState for CounterState {
    type Reducer = CounterFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

pub enum CounterAction {
    Increment,
}

pub struct CounterFeature;

impl Reducer for CounterFeature {
    type State = CounterState;
    type Action = CounterAction;
    type Event = ();
    type Command = ();

    fn reduce(&self, state: &mut CounterState, action: CounterAction) -> Procedure<CounterAction> {
        match action {
            CounterAction::Increment => state.count += 1,
        }
        Procedure::none()
    }
}

/// A stack entry backed by a throwaway counter view model.
pub fn entry() -> NavigatorInfo {
    NavigatorInfo::new(ViewModel::new(CounterState::new(0), CounterFeature).erase())
}

fn no_view(_: &AnyViewModel) -> Option<Rendered> {
    None
}

pub fn no_views() -> ViewBuilder {
    Rc::new(no_view)
}

// -- Child: events and commands ----------------------------------------------

pub struct ChildState {
    channels: Channels<Self>,
    pub value: i32,
}

impl ChildState {
    pub fn new(value: i32) -> Self {
        Self {
            channels: Channels::default(),
            value,
        }
    }
}

impl BusinessState for ChildState {
    type Reducer = ChildFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChildEvent {
    Changed(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChildCommand {
    Reset,
}

pub enum ChildAction {
    Set(i32),
    Close,
}

pub struct ChildFeature;

impl Reducer for ChildFeature {
    type State = ChildState;
    type Action = ChildAction;
    type Event = ChildEvent;
    type Command = ChildCommand;

    fn reduce(&self, state: &mut ChildState, action: ChildAction) -> Procedure<ChildAction> {
        match action {
            ChildAction::Set(value) => {
                state.value = value;
                state.fire_event(ChildEvent::Changed(value));
                Procedure::none()
            }
            ChildAction::Close => Procedure::dismiss(),
        }
    }

    fn reduce_command(&self, state: &mut ChildState, command: ChildCommand) -> Procedure<ChildAction> {
        match command {
            ChildCommand::Reset => state.value = 0,
        }
        Procedure::none()
    }
}

// -- Row: collection element ---------------------------------------------------

pub struct RowState {
    channels: Channels<Self>,
    pub id: u32,
    pub title: String,
}

impl RowState {
    pub fn new(id: u32, title: &str) -> Self {
        Self {
            channels: Channels::default(),
            id,
            title: title.to_string(),
        }
    }
}

impl Identified for RowState {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

impl BusinessState for RowState {
    type Reducer = RowFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowEvent {
    Tapped(u32),
}

pub enum RowAction {
    Tap,
}

pub struct RowFeature;

impl Reducer for RowFeature {
    type State = RowState;
    type Action = RowAction;
    type Event = RowEvent;
    type Command = ();

    fn reduce(&self, state: &mut RowState, action: RowAction) -> Procedure<RowAction> {
        match action {
            RowAction::Tap => state.fire_event(RowEvent::Tapped(state.id)),
        }
        Procedure::none()
    }
}

// -- Parent: owns a child, an optional counter and rows ----------------------

pub struct ParentState {
    channels: Channels<Self>,
    pub child: StateRef<ChildState>,
    pub counter: Option<StateRef<CounterState>>,
    pub rows: IdentifiedVec<RowState>,
    pub received: Vec<i32>,
    pub tapped: Vec<u32>,
}

impl ParentState {
    pub fn new() -> Self {
        Self {
            channels: Channels::default(),
            child: StateRef::new(ChildState::new(0)),
            counter: None,
            rows: IdentifiedVec::new(),
            received: Vec::new(),
            tapped: Vec::new(),
        }
    }
}

impl BusinessState for ParentState {
    type Reducer = ParentFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

pub enum ParentAction {
    ChildChanged(i32),
    RowTapped(u32),
}

pub struct ParentFeature;

impl Reducer for ParentFeature {
    type State = ParentState;
    type Action = ParentAction;
    type Event = ();
    type Command = ();

    fn reduce(&self, state: &mut ParentState, action: ParentAction) -> Procedure<ParentAction> {
        match action {
            ParentAction::ChildChanged(value) => state.received.push(value),
            ParentAction::RowTapped(id) => state.tapped.push(id),
        }
        Procedure::none()
    }
}

pub fn parent() -> ViewModel<ParentState> {
    ViewModel::new(ParentState::new(), ParentFeature)
}

pub fn child_to_parent(event: ChildEvent) -> Option<ParentAction> {
    match event {
        ChildEvent::Changed(value) => Some(ParentAction::ChildChanged(value)),
    }
}

// -- Navigation: home, detail, settings flow ---------------------------------

pub struct HomeState {
    channels: Channels<Self>,
    navigation: NavigationChannels<Self>,
    pub detail: Option<StateRef<DetailState>>,
    pub unregistered: Option<StateRef<UnregisteredState>>,
    pub settings: Option<StateRef<NavigationFlow>>,
    pub events: Vec<String>,
}

impl HomeState {
    pub fn new() -> Self {
        Self {
            channels: Channels::default(),
            navigation: NavigationChannels::default(),
            detail: None,
            unregistered: None,
            settings: None,
            events: Vec::new(),
        }
    }
}

impl BusinessState for HomeState {
    type Reducer = HomeFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

impl NavigatableState for HomeState {
    type NavigatorEvent = ();

    fn navigation(&self) -> &NavigationChannels<Self> {
        &self.navigation
    }
}

pub enum HomeAction {
    OpenDetail(&'static str, RouteStyle),
    OpenUnregistered,
    OpenSettings(RouteStyle),
    OpenBareFlow,
    DetailSaved(String),
    SettingsDone,
    DismissAny,
}

pub struct HomeFeature;

impl Reducer for HomeFeature {
    type State = HomeState;
    type Action = HomeAction;
    type Event = ();
    type Command = ();

    fn reduce(&self, state: &mut HomeState, action: HomeAction) -> Procedure<HomeAction> {
        match action {
            HomeAction::OpenDetail(title, style) => {
                state.detail = Some(StateRef::new(DetailState::new(title)));
                state.route(
                    ScreenRoute::new(lens!(HomeState, detail), DetailFeature, style).on_event(|event| match event {
                        DetailEvent::Saved(title) => Some(HomeAction::DetailSaved(title)),
                    }),
                );
            }
            HomeAction::OpenUnregistered => {
                state.unregistered = Some(StateRef::new(UnregisteredState::new()));
                state.route_to(lens!(HomeState, unregistered), UnregisteredFeature, RouteStyle::Push);
            }
            HomeAction::OpenSettings(style) => {
                state.settings = Some(StateRef::new(settings_flow()));
                state.route(
                    FlowRoute::new(
                        lens!(HomeState, settings),
                        StateRef::new(SettingsRootState::new()),
                        SettingsRootFeature,
                        style,
                    )
                    .on_output(|_: &SettingsDone| Some(HomeAction::SettingsDone)),
                );
            }
            HomeAction::OpenBareFlow => {
                state.settings = Some(StateRef::new(NavigationFlow::builder().build()));
                state.route(FlowRoute::new(
                    lens!(HomeState, settings),
                    StateRef::new(SettingsRootState::new()),
                    SettingsRootFeature,
                    RouteStyle::Push,
                ));
            }
            HomeAction::DetailSaved(title) => state.events.push(format!("saved {title}")),
            HomeAction::SettingsDone => state.events.push("settings done".to_string()),
            HomeAction::DismissAny => return Procedure::dismiss(),
        }
        Procedure::none()
    }
}

pub struct DetailState {
    channels: Channels<Self>,
    navigation: NavigationChannels<Self>,
    pub title: String,
    pub next: Option<StateRef<DetailState>>,
}

impl DetailState {
    pub fn new(title: &str) -> Self {
        Self {
            channels: Channels::default(),
            navigation: NavigationChannels::default(),
            title: title.to_string(),
            next: None,
        }
    }
}

impl BusinessState for DetailState {
    type Reducer = DetailFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

impl NavigatableState for DetailState {
    type NavigatorEvent = ();

    fn navigation(&self) -> &NavigationChannels<Self> {
        &self.navigation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailEvent {
    Saved(String),
}

pub enum DetailAction {
    Save,
    OpenNext(&'static str),
    Dismiss(DismissType),
    DismissAny,
}

pub struct DetailFeature;

impl Reducer for DetailFeature {
    type State = DetailState;
    type Action = DetailAction;
    type Event = DetailEvent;
    type Command = ();

    fn reduce(&self, state: &mut DetailState, action: DetailAction) -> Procedure<DetailAction> {
        match action {
            DetailAction::Save => state.fire_event(DetailEvent::Saved(state.title.clone())),
            DetailAction::OpenNext(title) => {
                state.next = Some(StateRef::new(DetailState::new(title)));
                state.route_to(lens!(DetailState, next), DetailFeature, RouteStyle::Push);
            }
            DetailAction::Dismiss(kind) => state.dismiss(kind),
            DetailAction::DismissAny => return Procedure::dismiss(),
        }
        Procedure::none()
    }
}

pub struct UnregisteredState {
    channels: Channels<Self>,
    navigation: NavigationChannels<Self>,
}

impl UnregisteredState {
    pub fn new() -> Self {
        Self {
            channels: Channels::default(),
            navigation: NavigationChannels::default(),
        }
    }
}

impl BusinessState for UnregisteredState {
    type Reducer = UnregisteredFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

impl NavigatableState for UnregisteredState {
    type NavigatorEvent = ();

    fn navigation(&self) -> &NavigationChannels<Self> {
        &self.navigation
    }
}

pub struct UnregisteredFeature;

impl Reducer for UnregisteredFeature {
    type State = UnregisteredState;
    type Action = ();
    type Event = ();
    type Command = ();

    fn reduce(&self, _state: &mut UnregisteredState, _action: ()) -> Procedure<()> {
        Procedure::none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsDone;

pub struct SettingsRootState {
    channels: Channels<Self>,
    navigation: NavigationChannels<Self>,
    pub detail: Option<StateRef<DetailState>>,
}

impl SettingsRootState {
    pub fn new() -> Self {
        Self {
            channels: Channels::default(),
            navigation: NavigationChannels::default(),
            detail: None,
        }
    }
}

impl BusinessState for SettingsRootState {
    type Reducer = SettingsRootFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

impl NavigatableState for SettingsRootState {
    type NavigatorEvent = SettingsDone;

    fn navigation(&self) -> &NavigationChannels<Self> {
        &self.navigation
    }
}

pub enum SettingsRootAction {
    OpenDetail(&'static str),
    Done,
    Close,
}

pub struct SettingsRootFeature;

impl Reducer for SettingsRootFeature {
    type State = SettingsRootState;
    type Action = SettingsRootAction;
    type Event = ();
    type Command = ();

    fn reduce(&self, state: &mut SettingsRootState, action: SettingsRootAction) -> Procedure<SettingsRootAction> {
        match action {
            SettingsRootAction::OpenDetail(title) => {
                state.detail = Some(StateRef::new(DetailState::new(title)));
                state.route_to(lens!(SettingsRootState, detail), DetailFeature, RouteStyle::Push);
                Procedure::none()
            }
            SettingsRootAction::Done => {
                state.fire_navigator_event(SettingsDone);
                Procedure::none()
            }
            SettingsRootAction::Close => Procedure::dismiss(),
        }
    }
}

pub fn settings_flow() -> NavigationFlow {
    NavigationFlow::builder()
        .descriptor(ViewDescriptor::new("settings", |_: ViewModel<SettingsRootState>| {
            "settings".to_string()
        }))
        .descriptor(ViewDescriptor::new("nested detail", |view_model: ViewModel<DetailState>| {
            view_model.with_state(|state| format!("nested detail: {}", state.title))
        }))
        .on_event(|done: &SettingsDone| Some(*done))
        .build()
}

pub fn app_flow() -> NavigationFlow {
    NavigationFlow::builder()
        .descriptor(ViewDescriptor::new("home", |_: ViewModel<HomeState>| "home".to_string()))
        .descriptor(ViewDescriptor::new("detail", |view_model: ViewModel<DetailState>| {
            view_model.with_state(|state| format!("detail: {}", state.title))
        }))
        .build()
}

pub fn mount_app() -> (Navigator, ViewModel<HomeState>) {
    Navigator::mount(app_flow(), StateRef::new(HomeState::new()), HomeFeature)
}

/// Render `info` and return the node's title.
pub fn title(navigator: &Navigator, info: &NavigatorInfo) -> Option<String> {
    navigator.build_view(info).downcast::<String>()
}

pub fn top_detail(navigator: &Navigator) -> Option<ViewModel<DetailState>> {
    navigator
        .path()
        .last()
        .and_then(|info| info.view_model().downcast::<DetailState>())
}

/// Counts calls; share it into callbacks with `clone()`.
#[derive(Clone, Default)]
pub struct Counter(Rc<RefCell<usize>>);

impl Counter {
    pub fn bump(&self) {
        *self.0.borrow_mut() += 1;
    }

    pub fn get(&self) -> usize {
        *self.0.borrow()
    }
}

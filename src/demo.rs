//! A small scripted app: home → detail, plus a settings flow that can be
//! pushed as a nested stack or presented as a sheet.

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

use waypoint::navigation::{Rendered, Screen, StackSnapshot, ViewDescriptor};
use waypoint::{
    lens, BusinessState, Channels, FlowRoute, NavigatableState, NavigationChannels, NavigationFlow,
    Navigator, Procedure, Reducer, RouteStyle, ScreenRoute, StateRef, ViewModel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Open a detail screen
    Push,
    /// Open a detail screen, then push the settings flow on top
    Nested,
    /// Present the settings flow as a sheet and close it from inside
    Sheet,
    /// Push the settings flow, then swipe back to the detail screen
    UserPop,
}

// -- Home --------------------------------------------------------------------

pub struct HomeState {
    channels: Channels<Self>,
    navigation: NavigationChannels<Self>,
    detail: Option<StateRef<DetailState>>,
    settings: Option<StateRef<NavigationFlow>>,
    saved: Vec<u32>,
    loads: u32,
    settings_closed: u32,
}

impl HomeState {
    fn new() -> Self {
        Self {
            channels: Channels::default(),
            navigation: NavigationChannels::default(),
            detail: None,
            settings: None,
            saved: Vec::new(),
            loads: 0,
            settings_closed: 0,
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
    OpenDetail(u32),
    OpenSettings(RouteStyle),
    DetailLoaded,
    DetailSaved(u32),
    SettingsClosed,
}

pub struct HomeFeature;

impl Reducer for HomeFeature {
    type State = HomeState;
    type Action = HomeAction;
    type Event = ();
    type Command = ();

    fn reduce(&self, state: &mut HomeState, action: HomeAction) -> Procedure<HomeAction> {
        match action {
            HomeAction::OpenDetail(item) => {
                state.detail = Some(StateRef::new(DetailState::new(item)));
                state.route(
                    ScreenRoute::new(lens!(HomeState, detail), DetailFeature, RouteStyle::Push).on_event(
                        |event| match event {
                            DetailEvent::Saved(item) => Some(HomeAction::DetailSaved(item)),
                        },
                    ),
                );
                Procedure::run(|send| async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    send.send(HomeAction::DetailLoaded);
                    Ok(())
                })
            }
            HomeAction::OpenSettings(style) => {
                state.settings = Some(StateRef::new(settings_flow()));
                state.route(
                    FlowRoute::new(
                        lens!(HomeState, settings),
                        StateRef::new(SettingsState::new()),
                        SettingsFeature,
                        style,
                    )
                    .on_output(|_: &SettingsClosed| Some(HomeAction::SettingsClosed)),
                );
                Procedure::none()
            }
            HomeAction::DetailLoaded => {
                state.loads += 1;
                Procedure::none()
            }
            HomeAction::DetailSaved(item) => {
                state.saved.push(item);
                Procedure::none()
            }
            HomeAction::SettingsClosed => {
                state.settings_closed += 1;
                Procedure::none()
            }
        }
    }
}

pub struct HomeScreen {
    title: String,
}

impl Screen for HomeScreen {
    type State = HomeState;

    fn make(view_model: ViewModel<HomeState>) -> Self {
        let saved = view_model.with_state(|state| state.saved.len());
        Self {
            title: format!("Home ({saved} saved)"),
        }
    }
}

// -- Detail ------------------------------------------------------------------

pub struct DetailState {
    channels: Channels<Self>,
    navigation: NavigationChannels<Self>,
    item: u32,
}

impl DetailState {
    fn new(item: u32) -> Self {
        Self {
            channels: Channels::default(),
            navigation: NavigationChannels::default(),
            item,
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

#[derive(Debug, Clone)]
pub enum DetailEvent {
    Saved(u32),
}

pub enum DetailAction {
    Save,
}

pub struct DetailFeature;

impl Reducer for DetailFeature {
    type State = DetailState;
    type Action = DetailAction;
    type Event = DetailEvent;
    type Command = ();

    fn reduce(&self, state: &mut DetailState, action: DetailAction) -> Procedure<DetailAction> {
        match action {
            DetailAction::Save => {
                state.fire_event(DetailEvent::Saved(state.item));
                Procedure::dismiss()
            }
        }
    }
}

// -- Settings flow -----------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct SettingsClosed;

pub struct SettingsState {
    channels: Channels<Self>,
    navigation: NavigationChannels<Self>,
}

impl SettingsState {
    fn new() -> Self {
        Self {
            channels: Channels::default(),
            navigation: NavigationChannels::default(),
        }
    }
}

impl BusinessState for SettingsState {
    type Reducer = SettingsFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

impl NavigatableState for SettingsState {
    type NavigatorEvent = SettingsClosed;

    fn navigation(&self) -> &NavigationChannels<Self> {
        &self.navigation
    }
}

pub enum SettingsAction {
    Close,
}

pub struct SettingsFeature;

impl Reducer for SettingsFeature {
    type State = SettingsState;
    type Action = SettingsAction;
    type Event = ();
    type Command = ();

    fn reduce(&self, state: &mut SettingsState, action: SettingsAction) -> Procedure<SettingsAction> {
        match action {
            SettingsAction::Close => {
                state.fire_navigator_event(SettingsClosed);
                Procedure::dismiss()
            }
        }
    }
}

fn settings_flow() -> NavigationFlow {
    NavigationFlow::builder()
        .descriptor(ViewDescriptor::new("SettingsScreen", |_: ViewModel<SettingsState>| {
            "Settings".to_string()
        }))
        .on_event(|closed: &SettingsClosed| Some(*closed))
        .build()
}

fn app_flow() -> NavigationFlow {
    NavigationFlow::builder()
        .view::<HomeScreen>()
        .descriptor(ViewDescriptor::new("DetailScreen", |view_model: ViewModel<DetailState>| {
            view_model.with_state(|state| format!("Detail #{}", state.item))
        }))
        .build()
}

// -- Report ------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Step {
    pub label: &'static str,
    pub stack: Option<StackSnapshot>,
    pub rendered: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub scenario: Scenario,
    pub steps: Vec<Step>,
    pub saved: Vec<u32>,
    pub loads: u32,
    pub settings_closed: u32,
    pub settings_open: bool,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario: {:?}", self.scenario)?;
        for step in &self.steps {
            writeln!(f, "\n[{}]", step.label)?;
            let Some(stack) = &step.stack else {
                writeln!(f, "  (not mounted)")?;
                continue;
            };
            writeln!(f, "  root: {}", stack.root)?;
            for (index, segment) in stack.segments.iter().enumerate() {
                writeln!(f, "  segment {index} ({}): [{}]", stack.owners[index], segment.join(", "))?;
            }
            if let Some(sheet) = &stack.sheet {
                writeln!(f, "  sheet: {sheet}")?;
            }
            if let Some(cover) = &stack.full_screen_cover {
                writeln!(f, "  full screen cover: {cover}")?;
            }
            writeln!(f, "  rendered: [{}]", step.rendered.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "saved: {:?}", self.saved)?;
        writeln!(f, "detail loads: {}", self.loads)?;
        writeln!(f, "settings closed: {}", self.settings_closed)?;
        writeln!(f, "settings slot open: {}", self.settings_open)
    }
}

fn render(rendered: Rendered) -> String {
    match rendered {
        Rendered::Empty => "(empty)".to_string(),
        Rendered::Navigator(_) => "(nested navigator)".to_string(),
        Rendered::Node(node) => match node.downcast::<String>() {
            Ok(title) => *title,
            Err(node) => node
                .downcast::<HomeScreen>()
                .map(|screen| screen.title)
                .unwrap_or_else(|_| "(unknown)".to_string()),
        },
    }
}

fn capture(label: &'static str, navigator: &Navigator) -> Step {
    let mut rendered: Vec<String> = navigator
        .path()
        .iter()
        .map(|info| render(navigator.build_view(info)))
        .collect();
    if let Some(sheet) = navigator.sheet() {
        rendered.push(format!("sheet: {}", render(navigator.build_view(&sheet))));
    }
    Step {
        label,
        stack: navigator.snapshot(),
        rendered,
    }
}

fn settings_root(home: &ViewModel<HomeState>) -> Option<ViewModel<SettingsState>> {
    let flow = home.with_state(|state| state.settings.clone())?;
    let root = flow.borrow().root_info().cloned()?;
    root.view_model().downcast::<SettingsState>()
}

/// Run `scenario` to completion. Must be called inside a `LocalSet`.
pub async fn run(scenario: Scenario) -> Report {
    let (navigator, home) = Navigator::mount(app_flow(), StateRef::new(HomeState::new()), HomeFeature);
    let mut steps = vec![capture("mounted", &navigator)];

    match scenario {
        Scenario::Push => {
            home.send(HomeAction::OpenDetail(7));
            steps.push(capture("opened detail", &navigator));
            if let Some(detail) = navigator
                .path()
                .last()
                .and_then(|info| info.view_model().downcast::<DetailState>())
            {
                detail.send(DetailAction::Save);
                steps.push(capture("saved detail", &navigator));
            }
        }
        Scenario::Nested => {
            home.send(HomeAction::OpenDetail(7));
            home.send(HomeAction::OpenSettings(RouteStyle::Push));
            steps.push(capture("pushed settings flow", &navigator));
        }
        Scenario::Sheet => {
            home.send(HomeAction::OpenSettings(RouteStyle::Sheet));
            steps.push(capture("presented settings sheet", &navigator));
            if let Some(settings) = settings_root(&home) {
                settings.send(SettingsAction::Close);
                steps.push(capture("closed settings from inside", &navigator));
            }
        }
        Scenario::UserPop => {
            home.send(HomeAction::OpenDetail(7));
            home.send(HomeAction::OpenSettings(RouteStyle::Push));
            steps.push(capture("pushed settings flow", &navigator));
            let path = navigator.path();
            navigator.set_path(path.into_iter().take(1).collect());
            steps.push(capture("swiped back to detail", &navigator));
        }
    }

    // Let pending effects finish.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (saved, loads, settings_closed, settings_open) = home.with_state(|state| {
        (
            state.saved.clone(),
            state.loads,
            state.settings_closed,
            state.settings.is_some(),
        )
    });
    Report {
        scenario,
        steps,
        saved,
        loads,
        settings_closed,
        settings_open,
    }
}

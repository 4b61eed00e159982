use crate::events::AppEvent;
use crate::gui::theme::{self, WheelTheme};
use crate::gui::wheel;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use spinwheel_core::config::{self, WheelConfig};
use spinwheel_core::wheel::{SpinController, SpinError, SpinResult, SpinStart};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// Text under the wheel.
#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    Hidden,
    Winner(String),
    Error(String),
}

impl Banner {
    fn text(&self) -> &str {
        match self {
            Self::Hidden => "",
            Self::Winner(name) | Self::Error(name) => name,
        }
    }
}

pub struct AppModel {
    pub controller: Rc<RefCell<SpinController>>,
    pub spinning: bool,
    pub banner: Banner,
    /// Reload that arrived mid-spin, applied once the wheel stops.
    pub pending_config: Option<WheelConfig>,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Spin,
    Reset,
    Tick,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Spin => AppMsg::Spin,
            AppEvent::Reset => AppMsg::Reset,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (SpinController, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Spin Wheel"),
            set_default_width: 720,
            set_default_height: 860,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::space || key == gtk::gdk::Key::Return {
                        sender.input(AppMsg::Spin);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 12,
                set_margin_all: 16,

                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_hexpand: true,
                    set_vexpand: true,
                    add_css_class: "wheel-drawing-area",
                },

                #[name = "banner"]
                gtk::Label {
                    add_css_class: "wheel-banner",
                    #[watch]
                    set_label: model.banner.text(),
                    #[watch]
                    set_visible: model.banner != Banner::Hidden,
                    #[watch]
                    set_class_active: ("error", matches!(model.banner, Banner::Error(_))),
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_halign: gtk::Align::Center,
                    set_spacing: 8,

                    gtk::Button {
                        set_label: "Spin",
                        add_css_class: "suggested-action",
                        #[watch]
                        set_sensitive: !model.spinning,
                        connect_clicked => AppMsg::Spin,
                    },

                    gtk::Button {
                        set_label: "Reset",
                        connect_clicked => AppMsg::Reset,
                    },
                },
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (controller, rx) = init;

        theme::load_css();

        let controller = Rc::new(RefCell::new(controller));

        let model = AppModel {
            controller: controller.clone(),
            spinning: false,
            banner: Banner::Hidden,
            pending_config: None,
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let state_draw = controller.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let theme = WheelTheme::from_context(&drawing_area.style_context());
                let controller = state_draw.borrow();
                if let Err(e) = wheel::draw(
                    cr,
                    controller.wheel(),
                    controller.rotation(),
                    controller.direction(),
                    width as f64,
                    height as f64,
                    &theme,
                ) {
                    log::error!("Drawing error: {}", e);
                }
            });

        // one tick per rendered frame while a spin is running
        let state_tick = controller.clone();
        let tick_sender = sender.clone();
        widgets.drawing_area.add_tick_callback(move |_, _| {
            if state_tick.borrow().is_spinning() {
                tick_sender.input(AppMsg::Tick);
            }
            glib::ControlFlow::Continue
        });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Spin => {
                let started = self
                    .controller
                    .borrow_mut()
                    .start_spin(Instant::now(), &mut rand::rng());
                match started {
                    Ok(SpinStart::Started) => {
                        self.spinning = true;
                        self.banner = Banner::Hidden;
                    }
                    Ok(SpinStart::AlreadySpinning) => {}
                    Err(e) => {
                        log::error!("Cannot start spin: {}", e);
                        self.banner = Banner::Error(format!("Configuration error: {e}"));
                    }
                }
            }
            AppMsg::Tick => {
                let result = self.controller.borrow_mut().tick(Instant::now());
                if let Some(result) = result {
                    self.show_result(&result);
                    self.apply_pending_config();
                }
                self.drawing_area.queue_draw();
            }
            AppMsg::Reset => {
                self.controller.borrow_mut().reset();
                self.spinning = false;
                self.banner = Banner::Hidden;
                self.apply_pending_config();
                self.drawing_area.queue_draw();
                log::info!("Wheel reset");
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.pending_config = Some(new_config);
                    self.apply_pending_config();
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn show_result(&mut self, result: &SpinResult) {
        self.spinning = false;
        self.banner = Banner::Winner(format!("Winner: {}", result.label()));
    }

    fn apply_pending_config(&mut self) {
        let Some(new_config) = self.pending_config.take() else {
            return;
        };

        match self.controller.borrow_mut().reconfigure(&new_config) {
            Ok(()) => {
                log::info!("Configuration reloaded");
                self.drawing_area.queue_draw();
            }
            Err(SpinError::Busy) => {
                log::debug!("Deferring configuration reload until the wheel stops");
                self.pending_config = Some(new_config);
            }
            Err(e) => log::error!("Failed to apply config: {}", e),
        }
    }
}

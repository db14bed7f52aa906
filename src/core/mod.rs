//! Runtime glue between klock-core and the GTK main loop

mod glib_scheduler;

pub use glib_scheduler::GlibScheduler;

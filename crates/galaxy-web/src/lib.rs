//! Browser bindings for the galaxy background
//!
//! Page glue creates one [`GalaxyBackground`] with a JSON options object,
//! calls `start()` and later `destroy()`. Everything else (the canvas,
//! event listeners, the animation-frame loop) is owned here.
//!
//! ```js
//! const galaxy = new GalaxyBackground(JSON.stringify({ hueShift: 140, density: 1.0 }));
//! if (!(await galaxy.start())) console.warn("no animated background");
//! // ...
//! galaxy.destroy();
//! ```

mod background;
mod dom;
mod listeners;
mod logging;
mod options;
mod raf;
mod util;

pub use background::GalaxyBackground;

pub mod frame_overlay_renderer;

//! Soundsphere library - Microphone feature extraction for audio-reactive visuals

pub mod audio;
pub mod cli;
pub mod params;
pub mod visual;

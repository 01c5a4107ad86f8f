mod client;
mod download;
mod helpers;

pub use client::HttpProbe;
pub use download::HttpDownloader;

fn main() {
    if let Err(err) = strava_data_viewer_lib::run() {
        eprintln!("strava-data-viewer: {err}");
        std::process::exit(1);
    }
}

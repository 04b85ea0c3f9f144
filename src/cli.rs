use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("camwatch")
        .version("0.1.0")
        .author("Camwatch Developers")
        .about("Streams a webcam to the browser and runs on-demand hat detection via a remote vision API.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom configuration file")
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
        )
        .subcommand(
            Command::new("capture")
                .about("Runs the capture supervisor: owns the camera, fills the shared frame buffer, reconnects on failure")
        )
        .subcommand(
            Command::new("serve")
                .about("Runs the web tier: MJPEG streaming, source switching, and frame analysis endpoints")
                .arg(Arg::new("listen").long("listen").value_name("ADDR").help("Listen address override, e.g. 0.0.0.0:8000").action(ArgAction::Set))
        )
}

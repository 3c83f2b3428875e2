use crate::errors::DehostError;

pub fn handle_error_and_exit(err: DehostError) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

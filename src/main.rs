#[macro_use]
extern crate rocket;

#[launch]
fn rocket() -> _ {
    recipe_import::init_logger();
    log::info!("starting recipe import service");
    recipe_import::rocket()
}

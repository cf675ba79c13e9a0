use ocrhub_kernel::domain::config::ApiConfig;
use ocrhub_kernel::domain::registry::{FeatureSlice, InitializedSlice};
use ocrhub_kernel::server::ApiState;

#[ocrhub_derive::ocrhub_slice]
pub struct Thumbnails {
    pub max_side: u32,
}

#[ocrhub_derive::ocrhub_slice(name = "layout-analysis")]
pub struct Layout {
    pub columns: usize,
}

#[test]
fn slice_name_defaults_to_lowercase_struct_name() {
    let slice = Thumbnails::new(ThumbnailsInner { max_side: 640 });
    assert_eq!(slice.name(), "thumbnails");
    assert_eq!(slice.max_side, 640);
}

#[test]
fn slice_name_can_be_overridden() {
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(InitializedSlice::new(Layout::new(LayoutInner { columns: 2 })))
        .build()
        .unwrap();

    assert_eq!(state.slice_names().collect::<Vec<_>>(), ["layout-analysis"]);
    assert_eq!(state.get_slice::<Layout>().unwrap().columns, 2);
}

#[test]
fn clones_share_the_inner_state() {
    let a = Thumbnails::new(ThumbnailsInner { max_side: 320 });
    let b = a.clone();
    assert!(std::ptr::eq(&*a, &*b));
}

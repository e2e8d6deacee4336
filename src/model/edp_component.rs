use crate::crd;

#[derive(Clone, Debug, PartialEq)]
pub struct EDPComponent {
    pub type_: String,
    pub url: String,
    pub icon: String,
    pub visible: bool,
}

pub fn convert(component: &crd::EDPComponent) -> EDPComponent {
    let spec = &component.spec;
    EDPComponent {
        type_: spec.type_.clone(),
        url: spec.url.clone(),
        icon: spec.icon.clone(),
        visible: spec.visible,
    }
}

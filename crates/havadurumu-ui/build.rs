use cxx_qt_build::{CxxQtBuilder, QmlModule};

fn main() {
    CxxQtBuilder::new_qml_module(QmlModule::new("havadurumu_ui").qml_file("qml/main.qml"))
        .file("src/models/weather_model.rs")
        .build();
}

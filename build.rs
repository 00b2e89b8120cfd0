//! 生成 RouteGuide / Echo 的 tonic 服务端与客户端代码
//!
//! 消息类型在 `pb` 模块中用 prost derive 手写，这里只生成服务桩，
//! 因此构建时不需要 protoc。

use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

fn method(name: &str, route: &str, input: &str, output: &str) -> tonic_build::manual::MethodBuilder {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::pb::{}", input))
        .output_type(format!("crate::pb::{}", output))
        .codec_path(CODEC)
}

fn main() {
    let route_guide = Service::builder()
        .name("RouteGuide")
        .package("routeguide")
        .method(method("get_feature", "GetFeature", "Point", "Feature").build())
        .method(
            method("list_features", "ListFeatures", "Rectangle", "Feature")
                .server_streaming()
                .build(),
        )
        .method(
            method("record_route", "RecordRoute", "Point", "RouteSummary")
                .client_streaming()
                .build(),
        )
        .method(
            method("route_chat", "RouteChat", "RouteNode", "RouteNode")
                .client_streaming()
                .server_streaming()
                .build(),
        )
        .build();

    let echo = Service::builder()
        .name("Echo")
        .package("routeguide")
        .method(
            method("conversations", "Conversations", "StreamRequest", "StreamResponse")
                .client_streaming()
                .server_streaming()
                .build(),
        )
        .build();

    Builder::new().compile(&[route_guide, echo]);
}

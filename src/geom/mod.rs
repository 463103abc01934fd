mod core;
mod line;
mod plane;
mod polygon;

pub use core::{BBox, Point3, Tolerance, Vec3, adaptive_tolerance};
pub use line::Line3;
pub use plane::Plane;
pub use polygon::{
    PlanarFrame, coplanar_polygons_overlap, point_in_polygon_2d, point_segment_distance_2d,
    polygon_contains, quad_aspect_ratio, quad_degenerate, quad_self_intersecting,
    segments_cross_any_projection, segments_intersect_2d,
};

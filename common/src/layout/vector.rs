//! 2次元ベクトル（euclid）と配置用の補助関数

pub type Unit = euclid::UnknownUnit;

pub type Vec2 = euclid::Vector2D<f64, Unit>;

pub fn vec2(x: f64, y: f64) -> Vec2 {
    euclid::vec2(x, y)
}

/// 角度（ラジアン）方向の単位ベクトル
pub fn from_angle(angle: f64) -> Vec2 {
    vec2(angle.cos(), angle.sin())
}

pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (a - b).length()
}

/// 単位ベクトル（長さ0なら0ベクトル）
pub fn unit_or_zero(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > f64::EPSILON {
        v / len
    } else {
        Vec2::zero()
    }
}

/// 左回りの垂直ベクトル
pub fn left_normal(v: Vec2) -> Vec2 {
    vec2(-v.y, v.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_helpers() {
        let a = vec2(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(distance(a, vec2(0.0, 0.0)), 5.0);
        assert_eq!(left_normal(a), vec2(-4.0, 3.0));
        assert_eq!(unit_or_zero(Vec2::zero()), Vec2::zero());
        assert!((unit_or_zero(a).length() - 1.0).abs() < 1e-12);
        assert!((from_angle(0.0) - vec2(1.0, 0.0)).length() < 1e-12);
    }
}

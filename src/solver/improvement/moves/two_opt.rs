use crate::models::{FloatType, IntType};
use crate::solver::improvement::local_search::route_cost;
use crate::solver::improvement::{LinkNode, LocalSearch, Move};

pub struct TwoOptIntraReverse;

impl Move for TwoOptIntraReverse {
    fn move_name(&self) -> &'static str {
        "TwoOptIntraReverse"
    }
    unsafe fn delta(&self, ls: &LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) -> FloatType {
        let u = &*u_rc;
        let v = &*v_rc;
        let r1 = u.route;
        let r2 = v.route;

        if (*r1).index != (*r2).index {
            return 0.0;
        }

        let x = &*u.successor;
        let y = &*v.successor;

        if u.position > v.position || x.number == v.number {
            return 0.0;
        }

        let delta_distance = -ls.distance(r1, u.number, x.number) - ls.distance(r1, v.number, y.number)
            + ls.distance(r1, u.number, v.number)
            + ls.distance(r1, x.number, y.number);

        delta_distance as FloatType
    }

    unsafe fn perform(&self, ls: &mut LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) {
        let r1 = (*u_rc).route;
        let x_rc = (*u_rc).successor;
        let y_rc = (*v_rc).successor;
        LinkNode::backward_reverse(v_rc, x_rc, std::ptr::null_mut());
        LinkNode::link_nodes(u_rc, v_rc);
        LinkNode::link_nodes(x_rc, y_rc);
        ls.update_route(r1);
    }
}

pub struct TwoOptInterReverse;

impl Move for TwoOptInterReverse {
    fn move_name(&self) -> &'static str {
        "TwoOptInterReverse"
    }
    unsafe fn delta(&self, ls: &LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) -> FloatType {
        let u = &*u_rc;
        let v = &*v_rc;
        let r1 = u.route;
        let r2 = v.route;

        if (*r1).index == (*r2).index {
            return 0.0;
        }

        let x = &*u.successor;
        let y = &*v.successor;

        let cap_one = ls.ctx.problem.vehicle_type((*r1).vehicle_type).capacity;
        let cap_two = ls.ctx.problem.vehicle_type((*r2).vehicle_type).capacity;

        let distance_one =
            u.cum_distance as IntType + v.cum_distance as IntType + ls.distance(r1, u.number, v.number);
        let distance_two = (*r1).distance as IntType - x.cum_distance as IntType
            + (*r2).distance as IntType
            - y.cum_distance as IntType
            + ls.distance(r2, x.number, y.number);
        let overload_one = u.cum_load as IntType + v.cum_load as IntType - cap_one;
        let overload_two =
            (*r1).load as IntType - u.cum_load as IntType + (*r2).load as IntType - v.cum_load as IntType - cap_two;

        let old_cost = (*r1).cost + (*r2).cost;
        let new_cost = route_cost(distance_one, overload_one, ls.evaluator.load_penalty)
            + route_cost(distance_two, overload_two, ls.evaluator.load_penalty);

        new_cost - old_cost
    }

    unsafe fn perform(&self, ls: &mut LocalSearch, u_rc: *mut LinkNode, mut v_rc: *mut LinkNode) {
        let r1 = (*u_rc).route;
        let r2 = (*v_rc).route;
        let mut x_rc = (*u_rc).successor;
        let y_rc = (*v_rc).successor;
        if !(*v_rc).is_depot() {
            LinkNode::backward_reverse(v_rc, std::ptr::null_mut(), (*r1).end_depot);
        } else {
            v_rc = (*r1).end_depot;
        }
        LinkNode::link_nodes(u_rc, v_rc);
        if !(*x_rc).is_depot() {
            LinkNode::forward_reverse(x_rc, std::ptr::null_mut(), (*r2).start_depot);
        } else {
            x_rc = (*r2).start_depot;
        }
        LinkNode::link_nodes(x_rc, y_rc);

        ls.update_route(r1);
        ls.update_route(r2);
    }
}

pub struct TwoOptInter;

impl Move for TwoOptInter {
    fn move_name(&self) -> &'static str {
        "TwoOptInter"
    }
    unsafe fn delta(&self, ls: &LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) -> FloatType {
        let u = &*u_rc;
        let v = &*v_rc;
        let r1 = u.route;
        let r2 = v.route;

        if (*r1).index == (*r2).index {
            return 0.0;
        }

        let x = &*u.successor;
        let y = &*v.successor;

        let cap_one = ls.ctx.problem.vehicle_type((*r1).vehicle_type).capacity;
        let cap_two = ls.ctx.problem.vehicle_type((*r2).vehicle_type).capacity;

        let distance_one = u.cum_distance as IntType + (*r2).distance as IntType
            - y.cum_distance as IntType
            + ls.distance(r1, u.number, y.number);
        let distance_two = v.cum_distance as IntType + (*r1).distance as IntType
            - x.cum_distance as IntType
            + ls.distance(r2, v.number, x.number);
        let overload_one = u.cum_load as IntType + (*r2).load as IntType - v.cum_load as IntType - cap_one;
        let overload_two = v.cum_load as IntType + (*r1).load as IntType - u.cum_load as IntType - cap_two;

        let old_cost = (*r1).cost + (*r2).cost;
        let new_cost = route_cost(distance_one, overload_one, ls.evaluator.load_penalty)
            + route_cost(distance_two, overload_two, ls.evaluator.load_penalty);

        new_cost - old_cost
    }

    unsafe fn perform(&self, ls: &mut LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) {
        let r1 = (*u_rc).route;
        let r2 = (*v_rc).route;
        let x_rc = (*u_rc).successor;
        let y_rc = (*v_rc).successor;
        LinkNode::link_nodes(u_rc, y_rc);
        LinkNode::link_nodes(v_rc, x_rc);
        LinkNode::replace_end_depot(v_rc, (*r2).end_depot);
        LinkNode::replace_end_depot(u_rc, (*r1).end_depot);
        ls.update_route(r1);
        ls.update_route(r2);
    }
}
